use serde::{Deserialize, Serialize};

use super::models::{Contest, ContestStatus};
use crate::shared::AppError;

/// Request body for creating a contest
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContestRequest {
    pub match_id: String,
    pub name: String,
    #[serde(default)]
    pub entry_fee: i64,
    #[serde(default)]
    pub prize_pool: i64,
    pub total_spots: u32,
    #[serde(default = "default_max_entries")]
    pub max_entries_per_user: u32,
    #[serde(default)]
    pub winner_percentage: f64,
    #[serde(default)]
    pub is_guaranteed: bool,
    #[serde(default)]
    pub status: ContestStatus,
}

fn default_max_entries() -> u32 {
    1
}

impl CreateContestRequest {
    /// Field checks shared by the admin endpoint and seed loading.
    /// Match existence is checked by the caller.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.total_spots == 0 {
            return Err(AppError::BadRequest("totalSpots must be positive".to_string()));
        }
        if self.max_entries_per_user == 0 {
            return Err(AppError::BadRequest(
                "maxEntriesPerUser must be positive".to_string(),
            ));
        }
        if self.name.trim().is_empty() {
            return Err(AppError::BadRequest("Contest name is required".to_string()));
        }
        Ok(())
    }

    /// Fresh contest with every spot free
    pub fn into_contest(self) -> Contest {
        let mut contest = Contest::new(
            &self.match_id,
            self.name.trim(),
            self.total_spots,
            self.max_entries_per_user,
        );
        contest.entry_fee = self.entry_fee;
        contest.prize_pool = self.prize_pool;
        contest.winner_percentage = self.winner_percentage;
        contest.is_guaranteed = self.is_guaranteed;
        contest.status = self.status;
        contest
    }
}

/// One ranked row of a contest leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub membership_id: String,
    pub user_id: String,
    pub roster_id: String,
    pub team_name: String,
    pub total_points: i64,
}
