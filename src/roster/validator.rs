use std::collections::HashSet;
use tracing::debug;

use super::{errors::RosterValidationError, models::RosterSubmission};
use crate::squad::MatchSquad;

pub const ROSTER_SIZE: usize = 6;

/// Checks a submission against the match squad.
///
/// Checks run in a fixed order and stop at the first failure: size,
/// uniqueness, captain assignment, squad membership.
pub fn validate(
    submission: &RosterSubmission,
    squad: &MatchSquad,
) -> Result<(), RosterValidationError> {
    let players = &submission.players;

    if players.len() != ROSTER_SIZE {
        return Err(RosterValidationError::WrongRosterSize {
            expected: ROSTER_SIZE,
            actual: players.len(),
        });
    }

    let mut seen = HashSet::with_capacity(ROSTER_SIZE);
    for player_id in players {
        if !seen.insert(player_id.as_str()) {
            return Err(RosterValidationError::DuplicatePlayer {
                player_id: player_id.clone(),
            });
        }
    }

    if submission.captain_id == submission.vice_captain_id
        || !seen.contains(submission.captain_id.as_str())
        || !seen.contains(submission.vice_captain_id.as_str())
    {
        return Err(RosterValidationError::InvalidCaptainAssignment);
    }

    if let Some(missing) = players.iter().find(|id| !squad.contains_player(id)) {
        return Err(RosterValidationError::PlayerNotInSquad {
            player_id: missing.clone(),
        });
    }

    debug!(match_id = %squad.match_id, "Roster passed validation");
    Ok(())
}
