// Public API - what other modules can use
pub use errors::RosterValidationError;
pub use models::{RosterSubmission, UserRoster};
pub use validator::{validate, ROSTER_SIZE};

// Internal modules
mod errors;
mod models;
mod validator;
