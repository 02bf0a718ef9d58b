pub mod builders;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use builders::{
    away_player, home_player, roster_of, valid_roster, DirectoryBuilder, AWAY_TEAM, HOME_TEAM,
};
#[allow(unused_imports)]
pub use setup::{TestSetup, TestSetupBuilder, MATCH_ID};
