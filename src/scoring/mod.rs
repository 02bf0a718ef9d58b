// Public API - what other modules can use
pub use engine::{compute_points, points};
pub use handlers::update_player_stats;
pub use models::PlayerLiveStats;
pub use service::StatsService;
pub use types::StatUpdateResponse;

// Internal modules
mod engine;
mod handlers;
mod models;
mod service;
mod types;
