use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Playing category shown on squad entries
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PlayerCategory {
    Setter,
    Attacker,
    Blocker,
    #[default]
    Universal,
}

/// Role a player holds within a team for the season
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AssociationRole {
    Captain,
    #[default]
    Player,
}

impl AssociationRole {
    pub fn is_captain(&self) -> bool {
        matches!(self, AssociationRole::Captain)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub id: String,
    pub league_id: String,
    pub home_team_id: String,
    pub away_team_id: String,
    pub start_time: DateTime<Utc>,
    pub status: String,
    #[serde(default)]
    pub venue: String,
}

impl MatchRecord {
    /// An upcoming match starting now, with no league or venue attached
    pub fn new(id: &str, home_team_id: &str, away_team_id: &str) -> Self {
        Self {
            id: id.to_string(),
            league_id: String::new(),
            home_team_id: home_team_id.to_string(),
            away_team_id: away_team_id.to_string(),
            start_time: Utc::now(),
            status: "upcoming".to_string(),
            venue: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRecord {
    pub id: String,
    pub name: String,
    pub code: String,
}

/// Master player record, independent of any team or match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub default_category: PlayerCategory,
    #[serde(default = "default_credits")]
    pub default_credits: f64,
}

fn default_credits() -> f64 {
    8.0
}

/// Season-long link between a player and a team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamAssociation {
    pub id: String,
    pub player_id: String,
    pub team_id: String,
    pub season: String,
    pub jersey_number: u32,
    #[serde(default)]
    pub role: AssociationRole,
    pub is_active: bool,
}
