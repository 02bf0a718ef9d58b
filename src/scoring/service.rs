use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{models::PlayerLiveStats, types::StatUpdateResponse};
use crate::shared::AppError;
use crate::squad::repository::{SquadRepository, StatsUpdateResult};

/// Stat-ingestion path: stores live counters and returns fresh totals
pub struct StatsService {
    squads: Arc<dyn SquadRepository + Send + Sync>,
}

impl StatsService {
    pub fn new(squads: Arc<dyn SquadRepository + Send + Sync>) -> Self {
        Self { squads }
    }

    #[instrument(skip(self, stats))]
    pub async fn update_player_stats(
        &self,
        match_id: &str,
        player_id: &str,
        stats: PlayerLiveStats,
    ) -> Result<StatUpdateResponse, AppError> {
        debug!(match_id = %match_id, player_id = %player_id, "Updating player stats");

        match self
            .squads
            .update_player_stats(match_id, player_id, stats)
            .await?
        {
            StatsUpdateResult::Updated(player) => {
                info!(
                    match_id = %match_id,
                    player_id = %player_id,
                    total_points = player.live_stats.total_points,
                    "Player stats updated"
                );
                Ok(StatUpdateResponse {
                    match_id: match_id.to_string(),
                    player_id: player.player_id,
                    total_points: player.live_stats.total_points,
                    live_stats: player.live_stats,
                })
            }
            StatsUpdateResult::SquadNotFound => Err(AppError::NotFound(format!(
                "No squad assigned for match {}",
                match_id
            ))),
            StatsUpdateResult::PlayerNotFound => Err(AppError::NotFound(format!(
                "Player {} is not in the squad for match {}",
                player_id, match_id
            ))),
            StatsUpdateResult::SetTalliesRewritten => {
                warn!(
                    match_id = %match_id,
                    player_id = %player_id,
                    "Rejected stats payload rewriting recorded sets"
                );
                Err(AppError::InvalidState(
                    "Set participation tallies are append-only".to_string(),
                ))
            }
        }
    }
}
