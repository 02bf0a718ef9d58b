use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

use super::repository::StatsUpdateResult;
use crate::directory::PlayerCategory;
use crate::scoring::PlayerLiveStats;

/// How the current squad document came to be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SquadSource {
    Auto,
    Manual,
}

/// One eligible player for a match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SquadPlayer {
    pub player_id: String,
    pub team_id: String,
    pub name: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub category: PlayerCategory,
    pub credits: f64,
    pub jersey_number: u32,
    pub is_starting: bool,
    #[serde(default)]
    pub live_stats: PlayerLiveStats,
}

/// Ordered squad for one side of a match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSquad {
    pub team_id: String,
    #[serde(default)]
    pub team_code: String,
    pub players: Vec<SquadPlayer>,
}

impl TeamSquad {
    pub fn starters(&self) -> impl Iterator<Item = &SquadPlayer> {
        self.players.iter().filter(|p| p.is_starting)
    }
}

/// Authoritative list of legal roster picks for a match.
/// Exactly one exists per match; a new write replaces the old one whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSquad {
    pub match_id: String,
    pub home: TeamSquad,
    pub away: TeamSquad,
    pub source: SquadSource,
    pub updated_at: DateTime<Utc>,
}

impl MatchSquad {
    pub fn players(&self) -> impl Iterator<Item = &SquadPlayer> {
        self.home.players.iter().chain(self.away.players.iter())
    }

    pub fn player_count(&self) -> usize {
        self.home.players.len() + self.away.players.len()
    }

    pub fn find_player(&self, player_id: &str) -> Option<&SquadPlayer> {
        self.players().find(|p| p.player_id == player_id)
    }

    pub fn contains_player(&self, player_id: &str) -> bool {
        self.find_player(player_id).is_some()
    }

    fn find_player_mut(&mut self, player_id: &str) -> Option<&mut SquadPlayer> {
        self.home
            .players
            .iter_mut()
            .chain(self.away.players.iter_mut())
            .find(|p| p.player_id == player_id)
    }

    /// Replaces one player's stats block, enforcing append-only set tallies
    /// and recomputing the cached total.
    pub fn apply_player_stats(
        &mut self,
        player_id: &str,
        stats: PlayerLiveStats,
    ) -> StatsUpdateResult {
        let Some(player) = self.find_player_mut(player_id) else {
            return StatsUpdateResult::PlayerNotFound;
        };

        if !stats.extends(&player.live_stats) {
            return StatsUpdateResult::SetTalliesRewritten;
        }

        player.live_stats = stats.with_recomputed_total();
        let updated = player.clone();
        self.updated_at = Utc::now();
        StatsUpdateResult::Updated(updated)
    }

    /// Recomputes every cached total, used before persisting edited squads
    pub fn refresh_totals(&mut self) {
        for player in self
            .home
            .players
            .iter_mut()
            .chain(self.away.players.iter_mut())
        {
            player.live_stats.refresh_total();
        }
    }
}
