use serde::{Deserialize, Serialize};

use super::engine::compute_points;

/// Raw in-match counters for one squad player.
///
/// `total_points` is a cache of [`compute_points`] and is rewritten from the
/// counters on every change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerLiveStats {
    pub attacks: u32,
    pub aces: u32,
    pub blocks: u32,
    pub receptions_success: u32,
    pub reception_errors: u32,
    /// Set numbers the player took part in
    pub sets_played: Vec<u32>,
    pub sets_as_starter: Vec<u32>,
    pub sets_as_substitute: Vec<u32>,
    pub total_points: i64,
}

impl PlayerLiveStats {
    /// Recomputes the cached total from the counters
    pub fn refresh_total(&mut self) -> i64 {
        self.total_points = compute_points(self);
        self.total_points
    }

    pub fn with_recomputed_total(mut self) -> Self {
        self.refresh_total();
        self
    }

    /// True when every set tally of `self` keeps `previous` as its prefix
    pub fn extends(&self, previous: &PlayerLiveStats) -> bool {
        self.sets_played.starts_with(&previous.sets_played)
            && self.sets_as_starter.starts_with(&previous.sets_as_starter)
            && self.sets_as_substitute.starts_with(&previous.sets_as_substitute)
    }
}
