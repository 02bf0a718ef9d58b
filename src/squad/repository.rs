use async_trait::async_trait;
use sqlx::{types::Json, PgPool, Row};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use super::models::{MatchSquad, SquadPlayer};
use crate::scoring::PlayerLiveStats;
use crate::shared::AppError;

/// Result of attempting to write one player's live stats
#[derive(Debug, Clone)]
pub enum StatsUpdateResult {
    /// Stats stored, returns the updated squad entry
    Updated(SquadPlayer),
    /// No squad has been assigned for the match
    SquadNotFound,
    /// Player is not part of the match squad
    PlayerNotFound,
    /// Payload drops or reorders already-recorded set tallies
    SetTalliesRewritten,
}

/// Trait for match squad storage
#[async_trait]
pub trait SquadRepository {
    async fn get_squad(&self, match_id: &str) -> Result<Option<MatchSquad>, AppError>;

    /// Stores the squad, fully replacing any previous squad for the match
    async fn put_squad(&self, squad: &MatchSquad) -> Result<(), AppError>;

    /// Atomically replaces one player's stats block inside the squad document
    async fn update_player_stats(
        &self,
        match_id: &str,
        player_id: &str,
        stats: PlayerLiveStats,
    ) -> Result<StatsUpdateResult, AppError>;
}

/// In-memory implementation of SquadRepository for development and testing
#[derive(Default)]
pub struct InMemorySquadRepository {
    squads: RwLock<HashMap<String, MatchSquad>>,
}

impl InMemorySquadRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn squad_count(&self) -> usize {
        self.squads.read().await.len()
    }
}

#[async_trait]
impl SquadRepository for InMemorySquadRepository {
    #[instrument(skip(self))]
    async fn get_squad(&self, match_id: &str) -> Result<Option<MatchSquad>, AppError> {
        let squads = self.squads.read().await;
        let squad = squads.get(match_id).cloned();

        match &squad {
            Some(s) => debug!(match_id = %match_id, players = s.player_count(), "Squad found in memory"),
            None => debug!(match_id = %match_id, "Squad not found in memory"),
        }

        Ok(squad)
    }

    #[instrument(skip(self, squad), fields(match_id = %squad.match_id))]
    async fn put_squad(&self, squad: &MatchSquad) -> Result<(), AppError> {
        let mut squads = self.squads.write().await;
        let replaced = squads
            .insert(squad.match_id.clone(), squad.clone())
            .is_some();

        debug!(replaced, players = squad.player_count(), "Squad stored in memory");
        Ok(())
    }

    #[instrument(skip(self, stats))]
    async fn update_player_stats(
        &self,
        match_id: &str,
        player_id: &str,
        stats: PlayerLiveStats,
    ) -> Result<StatsUpdateResult, AppError> {
        let mut squads = self.squads.write().await;

        let Some(squad) = squads.get_mut(match_id) else {
            debug!(match_id = %match_id, "No squad to update");
            return Ok(StatsUpdateResult::SquadNotFound);
        };

        Ok(squad.apply_player_stats(player_id, stats))
    }
}

/// PostgreSQL implementation storing one JSONB squad document per match
pub struct PostgresSquadRepository {
    pool: PgPool,
}

impl PostgresSquadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SquadRepository for PostgresSquadRepository {
    #[instrument(skip(self))]
    async fn get_squad(&self, match_id: &str) -> Result<Option<MatchSquad>, AppError> {
        let row = sqlx::query("SELECT squad FROM match_squads WHERE match_id = $1")
            .bind(match_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, match_id = %match_id, "Failed to fetch squad from database");
                AppError::DatabaseError(e.to_string())
            })?;

        Ok(row.map(|row| row.get::<Json<MatchSquad>, _>("squad").0))
    }

    #[instrument(skip(self, squad), fields(match_id = %squad.match_id))]
    async fn put_squad(&self, squad: &MatchSquad) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO match_squads (match_id, squad, updated_at) VALUES ($1, $2, $3) \
             ON CONFLICT (match_id) DO UPDATE SET squad = EXCLUDED.squad, updated_at = EXCLUDED.updated_at",
        )
        .bind(&squad.match_id)
        .bind(Json(squad))
        .bind(squad.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to store squad in database");
            AppError::DatabaseError(e.to_string())
        })?;

        debug!(players = squad.player_count(), "Squad stored in database");
        Ok(())
    }

    #[instrument(skip(self, stats))]
    async fn update_player_stats(
        &self,
        match_id: &str,
        player_id: &str,
        stats: PlayerLiveStats,
    ) -> Result<StatsUpdateResult, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT squad FROM match_squads WHERE match_id = $1 FOR UPDATE")
            .bind(match_id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(row) = row else {
            return Ok(StatsUpdateResult::SquadNotFound);
        };

        let mut squad = row.get::<Json<MatchSquad>, _>("squad").0;
        let result = squad.apply_player_stats(player_id, stats);

        if let StatsUpdateResult::Updated(player) = &result {
            sqlx::query("UPDATE match_squads SET squad = $2, updated_at = $3 WHERE match_id = $1")
                .bind(match_id)
                .bind(Json(&squad))
                .bind(squad.updated_at)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;

            info!(
                match_id = %match_id,
                player_id = %player_id,
                total_points = player.live_stats.total_points,
                "Player stats stored in database"
            );
        }

        Ok(result)
    }
}
