use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Roster as submitted by a user joining a contest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterSubmission {
    #[serde(default)]
    pub team_name: Option<String>,
    pub players: Vec<String>,
    pub captain_id: String,
    pub vice_captain_id: String,
}

impl RosterSubmission {
    pub fn new(players: Vec<String>, captain_id: &str, vice_captain_id: &str) -> Self {
        Self {
            team_name: None,
            players,
            captain_id: captain_id.to_string(),
            vice_captain_id: vice_captain_id.to_string(),
        }
    }

    pub fn with_team_name(mut self, team_name: &str) -> Self {
        self.team_name = Some(team_name.to_string());
        self
    }
}

/// A user's six-player selection for one contest.
/// Created once during admission and never modified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRoster {
    pub id: String,
    pub user_id: String,
    pub match_id: String,
    pub contest_id: String,
    pub team_name: String,
    pub players: Vec<String>,
    pub captain_id: String,
    pub vice_captain_id: String,
    pub created_at: DateTime<Utc>,
}

impl UserRoster {
    /// Builds the stored roster from an already-validated submission.
    /// A blank or missing team name gets a generated two-word one.
    pub fn from_submission(
        submission: RosterSubmission,
        user_id: &str,
        match_id: &str,
        contest_id: &str,
    ) -> Self {
        let team_name = submission
            .team_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| petname::Petnames::default().generate_one(2, "-"));

        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            match_id: match_id.to_string(),
            contest_id: contest_id.to_string(),
            team_name,
            players: submission.players,
            captain_id: submission.captain_id,
            vice_captain_id: submission.vice_captain_id,
            created_at: Utc::now(),
        }
    }
}
