// Public API - what other modules can use
pub use handlers::{
    create_contest, get_contest, get_leaderboard, join_contest, list_contests_for_match,
    list_my_rosters,
};
pub use models::{AdmissionDenial, Contest, ContestMembership, ContestStatus, MembershipReceipt};
pub use repository::{InMemoryContestRepository, PostgresContestRepository};
pub use service::ContestRegistry;
pub use types::{CreateContestRequest, LeaderboardEntry};

// Internal modules
mod handlers;
mod models;
pub mod repository;
mod service;
mod types;
