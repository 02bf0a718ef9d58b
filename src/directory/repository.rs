use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::models::{
    AssociationRole, MatchRecord, PlayerCategory, PlayerRecord, TeamAssociation, TeamRecord,
};
use crate::shared::AppError;

/// Read-only view of the league directory (matches, teams, players and
/// team-roster associations). Writes happen outside this service.
#[async_trait]
pub trait DirectoryRepository {
    async fn get_match(&self, match_id: &str) -> Result<Option<MatchRecord>, AppError>;
    async fn get_team(&self, team_id: &str) -> Result<Option<TeamRecord>, AppError>;
    async fn get_player(&self, player_id: &str) -> Result<Option<PlayerRecord>, AppError>;

    /// All associations for a team, active or not, in storage order
    async fn list_team_associations(
        &self,
        team_id: &str,
    ) -> Result<Vec<TeamAssociation>, AppError>;
}

/// In-memory directory, seeded at startup or by tests
#[derive(Default)]
pub struct InMemoryDirectoryRepository {
    matches: RwLock<HashMap<String, MatchRecord>>,
    teams: RwLock<HashMap<String, TeamRecord>>,
    players: RwLock<HashMap<String, PlayerRecord>>,
    associations: RwLock<Vec<TeamAssociation>>,
}

impl InMemoryDirectoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a directory pre-populated with records
    pub fn with_records(
        matches: Vec<MatchRecord>,
        teams: Vec<TeamRecord>,
        players: Vec<PlayerRecord>,
        associations: Vec<TeamAssociation>,
    ) -> Self {
        Self {
            matches: RwLock::new(matches.into_iter().map(|m| (m.id.clone(), m)).collect()),
            teams: RwLock::new(teams.into_iter().map(|t| (t.id.clone(), t)).collect()),
            players: RwLock::new(players.into_iter().map(|p| (p.id.clone(), p)).collect()),
            associations: RwLock::new(associations),
        }
    }

    pub async fn insert_match(&self, record: MatchRecord) {
        self.matches.write().await.insert(record.id.clone(), record);
    }

    pub async fn insert_team(&self, record: TeamRecord) {
        self.teams.write().await.insert(record.id.clone(), record);
    }

    pub async fn insert_player(&self, record: PlayerRecord) {
        self.players.write().await.insert(record.id.clone(), record);
    }

    pub async fn remove_player(&self, player_id: &str) -> Option<PlayerRecord> {
        self.players.write().await.remove(player_id)
    }

    pub async fn insert_association(&self, association: TeamAssociation) {
        self.associations.write().await.push(association);
    }

    /// Marks an association inactive, returning whether it existed
    pub async fn deactivate_association(&self, association_id: &str) -> bool {
        let mut associations = self.associations.write().await;
        match associations.iter_mut().find(|a| a.id == association_id) {
            Some(association) => {
                association.is_active = false;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl DirectoryRepository for InMemoryDirectoryRepository {
    async fn get_match(&self, match_id: &str) -> Result<Option<MatchRecord>, AppError> {
        Ok(self.matches.read().await.get(match_id).cloned())
    }

    async fn get_team(&self, team_id: &str) -> Result<Option<TeamRecord>, AppError> {
        Ok(self.teams.read().await.get(team_id).cloned())
    }

    async fn get_player(&self, player_id: &str) -> Result<Option<PlayerRecord>, AppError> {
        Ok(self.players.read().await.get(player_id).cloned())
    }

    async fn list_team_associations(
        &self,
        team_id: &str,
    ) -> Result<Vec<TeamAssociation>, AppError> {
        let associations = self.associations.read().await;
        Ok(associations
            .iter()
            .filter(|a| a.team_id == team_id)
            .cloned()
            .collect())
    }
}

/// PostgreSQL implementation of the directory
pub struct PostgresDirectoryRepository {
    pool: PgPool,
}

impl PostgresDirectoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn parse_role(role: &str) -> Result<AssociationRole, AppError> {
    role.parse().map_err(|_| {
        warn!(role = %role, "Unknown association role in directory");
        AppError::DatabaseError(format!("Unknown association role: {}", role))
    })
}

fn parse_category(category: &str) -> Result<PlayerCategory, AppError> {
    category.parse().map_err(|_| {
        warn!(category = %category, "Unknown player category in directory");
        AppError::DatabaseError(format!("Unknown player category: {}", category))
    })
}

fn association_from_row(row: &PgRow) -> Result<TeamAssociation, AppError> {
    let role: String = row.get("role");
    Ok(TeamAssociation {
        id: row.get("id"),
        player_id: row.get("player_id"),
        team_id: row.get("team_id"),
        season: row.get("season"),
        jersey_number: row.get::<i32, _>("jersey_number").max(0) as u32,
        role: parse_role(&role)?,
        is_active: row.get("is_active"),
    })
}

#[async_trait]
impl DirectoryRepository for PostgresDirectoryRepository {
    #[instrument(skip(self))]
    async fn get_match(&self, match_id: &str) -> Result<Option<MatchRecord>, AppError> {
        let row = sqlx::query(
            "SELECT id, league_id, home_team_id, away_team_id, start_time, status, venue FROM matches WHERE id = $1",
        )
        .bind(match_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, match_id = %match_id, "Failed to fetch match from database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(row.map(|row| MatchRecord {
            id: row.get("id"),
            league_id: row.get("league_id"),
            home_team_id: row.get("home_team_id"),
            away_team_id: row.get("away_team_id"),
            start_time: row.get("start_time"),
            status: row.get("status"),
            venue: row.get("venue"),
        }))
    }

    #[instrument(skip(self))]
    async fn get_team(&self, team_id: &str) -> Result<Option<TeamRecord>, AppError> {
        let row = sqlx::query("SELECT id, name, code FROM teams WHERE id = $1")
            .bind(team_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, team_id = %team_id, "Failed to fetch team from database");
                AppError::DatabaseError(e.to_string())
            })?;

        Ok(row.map(|row| TeamRecord {
            id: row.get("id"),
            name: row.get("name"),
            code: row.get("code"),
        }))
    }

    #[instrument(skip(self))]
    async fn get_player(&self, player_id: &str) -> Result<Option<PlayerRecord>, AppError> {
        let row = sqlx::query(
            "SELECT id, name, image_url, default_category, default_credits FROM players WHERE id = $1",
        )
        .bind(player_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, player_id = %player_id, "Failed to fetch player from database");
            AppError::DatabaseError(e.to_string())
        })?;

        row.map(|row| {
            let category: String = row.get("default_category");
            Ok(PlayerRecord {
                id: row.get("id"),
                name: row.get("name"),
                image_url: row.get("image_url"),
                default_category: parse_category(&category)?,
                default_credits: row.get("default_credits"),
            })
        })
        .transpose()
    }

    #[instrument(skip(self))]
    async fn list_team_associations(
        &self,
        team_id: &str,
    ) -> Result<Vec<TeamAssociation>, AppError> {
        let rows = sqlx::query(
            "SELECT id, player_id, team_id, season, jersey_number, role, is_active FROM team_associations WHERE team_id = $1",
        )
        .bind(team_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, team_id = %team_id, "Failed to list team associations");
            AppError::DatabaseError(e.to_string())
        })?;

        debug!(team_id = %team_id, count = rows.len(), "Team associations loaded");
        rows.iter().map(association_from_row).collect()
    }
}
