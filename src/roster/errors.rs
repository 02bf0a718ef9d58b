use thiserror::Error;

/// Reasons a submitted roster is rejected before admission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterValidationError {
    #[error("Roster must have exactly {expected} players, got {actual}")]
    WrongRosterSize { expected: usize, actual: usize },

    #[error("Player {player_id} appears more than once")]
    DuplicatePlayer { player_id: String },

    #[error("Captain and vice-captain must be two different roster players")]
    InvalidCaptainAssignment,

    #[error("Player {player_id} is not in the squad for this match")]
    PlayerNotInSquad { player_id: String },
}

impl RosterValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            RosterValidationError::WrongRosterSize { .. } => "WRONG_ROSTER_SIZE",
            RosterValidationError::DuplicatePlayer { .. } => "DUPLICATE_PLAYER",
            RosterValidationError::InvalidCaptainAssignment => "INVALID_CAPTAIN_ASSIGNMENT",
            RosterValidationError::PlayerNotInSquad { .. } => "PLAYER_NOT_IN_SQUAD",
        }
    }
}
