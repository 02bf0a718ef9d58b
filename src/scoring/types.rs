use serde::{Deserialize, Serialize};

use super::models::PlayerLiveStats;

/// Response for the stat-update endpoint
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatUpdateResponse {
    pub match_id: String,
    pub player_id: String,
    pub total_points: i64,
    pub live_stats: PlayerLiveStats,
}
