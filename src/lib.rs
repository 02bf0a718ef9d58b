// Library crate for the fantasy volleyball contest service
// This file exposes the public API for the binary and integration tests

pub mod auth;
pub mod config;
pub mod contest;
pub mod directory;
pub mod roster;
pub mod routes;
pub mod scoring;
pub mod seed;
pub mod shared;
pub mod squad;

// Re-export commonly used types for easier access in tests
pub use config::AppConfig;
pub use contest::{repository::ContestRepository, Contest, ContestRegistry, MembershipReceipt};
pub use roster::{RosterSubmission, RosterValidationError};
pub use routes::build_router;
pub use scoring::{compute_points, PlayerLiveStats};
pub use shared::{AppError, AppState};
pub use squad::{repository::SquadRepository, MatchSquad, SquadAssigner};
