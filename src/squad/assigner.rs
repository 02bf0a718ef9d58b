use chrono::Utc;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{
    models::{MatchSquad, SquadPlayer, SquadSource, TeamSquad},
    repository::SquadRepository,
};
use crate::directory::{AssociationRole, DirectoryRepository, TeamAssociation};
use crate::scoring::PlayerLiveStats;
use crate::shared::AppError;

/// Number of players flagged as starting per side
pub const STARTING_SIZE: usize = 6;

/// Squad produced by an assignment run plus the players that were skipped
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentOutcome {
    pub squad: MatchSquad,
    pub unresolved_players: usize,
}

/// Starting flags for players in iteration order.
///
/// Captains are pinned first; the remaining slots up to [`STARTING_SIZE`] go
/// to the earliest non-captains.
pub fn starting_flags(roles: &[AssociationRole]) -> Vec<bool> {
    let captains = roles.iter().filter(|role| role.is_captain()).count();
    let mut open_slots = STARTING_SIZE.saturating_sub(captains);

    roles
        .iter()
        .map(|role| {
            if role.is_captain() {
                true
            } else if open_slots > 0 {
                open_slots -= 1;
                true
            } else {
                false
            }
        })
        .collect()
}

/// Keeps one association per player: the latest season wins, then the
/// lower jersey number. Result is in iteration order.
fn one_per_player(mut associations: Vec<TeamAssociation>) -> Vec<TeamAssociation> {
    associations.sort_by(|a, b| {
        b.season
            .cmp(&a.season)
            .then_with(|| a.jersey_number.cmp(&b.jersey_number))
    });
    let mut seen = HashSet::new();
    associations.retain(|a| seen.insert(a.player_id.clone()));
    sort_associations(&mut associations);
    associations
}

/// Iteration order for association processing: jersey number, then player id
fn sort_associations(associations: &mut [TeamAssociation]) {
    associations.sort_by(|a, b| {
        a.jersey_number
            .cmp(&b.jersey_number)
            .then_with(|| a.player_id.cmp(&b.player_id))
    });
}

/// Derives the match-day squad from team-roster associations
pub struct SquadAssigner {
    directory: Arc<dyn DirectoryRepository + Send + Sync>,
    squads: Arc<dyn SquadRepository + Send + Sync>,
}

impl SquadAssigner {
    pub fn new(
        directory: Arc<dyn DirectoryRepository + Send + Sync>,
        squads: Arc<dyn SquadRepository + Send + Sync>,
    ) -> Self {
        Self { directory, squads }
    }

    /// Regenerates and stores the squad for a match.
    ///
    /// Live stats are reset to zero on every run, so this must not be invoked
    /// once a match is accruing stats.
    #[instrument(skip(self))]
    pub async fn assign(&self, match_id: &str) -> Result<AssignmentOutcome, AppError> {
        let record = self
            .directory
            .get_match(match_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Match {} not found", match_id)))?;

        let (home, home_unresolved) = self.build_team_squad(&record.home_team_id).await?;
        let (away, away_unresolved) = self.build_team_squad(&record.away_team_id).await?;
        let unresolved_players = home_unresolved + away_unresolved;

        if home.players.is_empty() && away.players.is_empty() {
            warn!(
                match_id = %match_id,
                unresolved_players,
                "No resolvable players for match, squad not written"
            );
            return Err(AppError::InvalidState(format!(
                "Match {} has no resolvable players",
                match_id
            )));
        }

        let squad = MatchSquad {
            match_id: match_id.to_string(),
            home,
            away,
            source: SquadSource::Auto,
            updated_at: Utc::now(),
        };

        self.squads.put_squad(&squad).await?;

        if unresolved_players > 0 {
            warn!(match_id = %match_id, unresolved_players, "Skipped associations without a player record");
        }
        info!(
            match_id = %match_id,
            players = squad.player_count(),
            home_starters = squad.home.starters().count(),
            away_starters = squad.away.starters().count(),
            "Squad assigned"
        );

        Ok(AssignmentOutcome {
            squad,
            unresolved_players,
        })
    }

    /// Builds one side, returning the squad and the number of skipped players
    async fn build_team_squad(&self, team_id: &str) -> Result<(TeamSquad, usize), AppError> {
        let team_code = self
            .directory
            .get_team(team_id)
            .await?
            .map(|team| team.code)
            .unwrap_or_default();

        let active: Vec<TeamAssociation> = self
            .directory
            .list_team_associations(team_id)
            .await?
            .into_iter()
            .filter(|a| a.is_active)
            .collect();
        let active_count = active.len();
        let associations = one_per_player(active);
        if associations.len() < active_count {
            debug!(
                team_id = %team_id,
                duplicates = active_count - associations.len(),
                "Collapsed duplicate associations"
            );
        }

        let mut resolved = Vec::with_capacity(associations.len());
        let mut unresolved = 0;

        for association in associations {
            match self.directory.get_player(&association.player_id).await? {
                Some(player) => resolved.push((association, player)),
                None => {
                    debug!(
                        team_id = %team_id,
                        player_id = %association.player_id,
                        "Player record missing, skipping association"
                    );
                    unresolved += 1;
                }
            }
        }

        let roles: Vec<AssociationRole> = resolved.iter().map(|(a, _)| a.role).collect();
        let flags = starting_flags(&roles);

        let players = resolved
            .into_iter()
            .zip(flags)
            .map(|((association, player), is_starting)| SquadPlayer {
                player_id: player.id,
                team_id: association.team_id,
                name: player.name,
                image_url: player.image_url,
                category: player.default_category,
                credits: player.default_credits,
                jersey_number: association.jersey_number,
                is_starting,
                live_stats: PlayerLiveStats::default(),
            })
            .collect();

        Ok((
            TeamSquad {
                team_id: team_id.to_string(),
                team_code,
                players,
            },
            unresolved,
        ))
    }
}
