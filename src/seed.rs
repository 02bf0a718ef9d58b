use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::contest::{Contest, CreateContestRequest, InMemoryContestRepository};
use crate::directory::{
    InMemoryDirectoryRepository, MatchRecord, PlayerRecord, TeamAssociation, TeamRecord,
};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to read seed file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse seed file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid seed contest {contest}: {reason}")]
    InvalidContest { contest: String, reason: String },
}

/// Contest entry in a seed file; `id` is generated when omitted
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedContest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(flatten)]
    pub request: CreateContestRequest,
}

/// Directory records and contests loaded into the in-memory stores at startup
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeedData {
    pub matches: Vec<MatchRecord>,
    pub teams: Vec<TeamRecord>,
    pub players: Vec<PlayerRecord>,
    pub associations: Vec<TeamAssociation>,
    pub contests: Vec<SeedContest>,
}

impl SeedData {
    pub fn from_file(path: &Path) -> Result<Self, SeedError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, SeedError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Contests are checked like admin-created ones and must reference a seeded match
    pub fn into_repositories(
        self,
    ) -> Result<(InMemoryDirectoryRepository, InMemoryContestRepository), SeedError> {
        info!(
            matches = self.matches.len(),
            teams = self.teams.len(),
            players = self.players.len(),
            associations = self.associations.len(),
            contests = self.contests.len(),
            "Seeding in-memory stores"
        );

        let match_ids: HashSet<&str> = self.matches.iter().map(|m| m.id.as_str()).collect();
        let mut contests = Vec::with_capacity(self.contests.len());
        for seed in self.contests {
            let label = seed.id.clone().unwrap_or_else(|| seed.request.name.clone());
            seed.request
                .validate()
                .map_err(|e| SeedError::InvalidContest {
                    contest: label.clone(),
                    reason: e.to_string(),
                })?;
            if !match_ids.contains(seed.request.match_id.as_str()) {
                return Err(SeedError::InvalidContest {
                    contest: label,
                    reason: format!("match {} is not seeded", seed.request.match_id),
                });
            }

            let mut contest = seed.request.into_contest();
            if let Some(id) = seed.id {
                contest.id = id;
            }
            contests.push(contest);
        }

        let directory = InMemoryDirectoryRepository::with_records(
            self.matches,
            self.teams,
            self.players,
            self.associations,
        );

        Ok((directory, InMemoryContestRepository::with_contests(contests)))
    }
}
