use serde::Deserialize;

use super::models::TeamSquad;

/// Request payload for a manual squad edit
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceSquadRequest {
    pub home: TeamSquad,
    pub away: TeamSquad,
}
