use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::{
    models::{MatchSquad, SquadSource},
    repository::SquadRepository,
    types::ReplaceSquadRequest,
};
use crate::directory::DirectoryRepository;
use crate::shared::AppError;

/// Squad reads and manual administrative edits
pub struct SquadService {
    squads: Arc<dyn SquadRepository + Send + Sync>,
    directory: Arc<dyn DirectoryRepository + Send + Sync>,
}

impl SquadService {
    pub fn new(
        squads: Arc<dyn SquadRepository + Send + Sync>,
        directory: Arc<dyn DirectoryRepository + Send + Sync>,
    ) -> Self {
        Self { squads, directory }
    }

    /// Current squad for a match, `None` when nothing has been assigned yet
    #[instrument(skip(self))]
    pub async fn get_squad(&self, match_id: &str) -> Result<Option<MatchSquad>, AppError> {
        debug!(match_id = %match_id, "Getting squad");
        self.squads.get_squad(match_id).await
    }

    /// Stores an admin-edited squad, superseding whatever was there
    #[instrument(skip(self, request))]
    pub async fn replace_squad(
        &self,
        match_id: &str,
        request: ReplaceSquadRequest,
    ) -> Result<MatchSquad, AppError> {
        let record = self
            .directory
            .get_match(match_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Match {} not found", match_id)))?;

        if request.home.team_id != record.home_team_id || request.away.team_id != record.away_team_id {
            return Err(AppError::BadRequest(format!(
                "Squad sides must be {} (home) and {} (away)",
                record.home_team_id, record.away_team_id
            )));
        }

        let mut seen = HashSet::new();
        for player in request.home.players.iter().chain(request.away.players.iter()) {
            if !seen.insert(player.player_id.as_str()) {
                return Err(AppError::BadRequest(format!(
                    "Player {} listed more than once",
                    player.player_id
                )));
            }
        }

        let mut squad = MatchSquad {
            match_id: match_id.to_string(),
            home: request.home,
            away: request.away,
            source: SquadSource::Manual,
            updated_at: Utc::now(),
        };
        squad.refresh_totals();

        self.squads.put_squad(&squad).await?;

        info!(
            match_id = %match_id,
            players = squad.player_count(),
            "Squad replaced manually"
        );

        Ok(squad)
    }
}
