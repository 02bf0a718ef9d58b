// Public API - what other modules can use
pub use assigner::{starting_flags, AssignmentOutcome, SquadAssigner, STARTING_SIZE};
pub use handlers::{assign_squad, get_squad, replace_squad};
pub use models::{MatchSquad, SquadPlayer, SquadSource, TeamSquad};
pub use service::SquadService;
pub use types::ReplaceSquadRequest;

// Internal modules
mod assigner;
mod handlers;
pub mod models;
pub mod repository;
mod service;
mod types;
