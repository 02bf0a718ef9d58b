use axum::Router;
use std::sync::Arc;

use volley_fantasy::{
    auth::{TokenConfig, UserRole},
    build_router,
    contest::{Contest, ContestRegistry, InMemoryContestRepository},
    directory::InMemoryDirectoryRepository,
    shared::AppState,
    squad::{repository::InMemorySquadRepository, SquadAssigner},
};

use super::builders::DirectoryBuilder;

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub const TEST_SECRET: &str = "integration-secret";
pub const MATCH_ID: &str = "match-1";

pub struct TestSetup {
    pub state: AppState,
    pub directory: Arc<InMemoryDirectoryRepository>,
    pub squads: Arc<InMemorySquadRepository>,
    pub contests: Arc<InMemoryContestRepository>,
}

impl TestSetup {
    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    pub fn registry(&self) -> Arc<ContestRegistry> {
        Arc::new(ContestRegistry::new(
            self.contests.clone(),
            self.squads.clone(),
            self.directory.clone(),
        ))
    }

    pub fn assigner(&self) -> SquadAssigner {
        SquadAssigner::new(self.directory.clone(), self.squads.clone())
    }

    pub fn token_for(&self, user_id: &str) -> String {
        self.state
            .token_config
            .create_token(user_id, UserRole::User)
            .unwrap()
    }

    pub fn admin_token(&self) -> String {
        self.state
            .token_config
            .create_token("ops-admin", UserRole::Admin)
            .unwrap()
    }
}

pub struct TestSetupBuilder {
    players_per_side: u32,
    contests: Vec<Contest>,
    assign_squad: bool,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            players_per_side: 8,
            contests: vec![],
            assign_squad: true,
        }
    }

    pub fn with_players_per_side(mut self, count: u32) -> Self {
        self.players_per_side = count;
        self
    }

    pub fn with_contest(mut self, contest: Contest) -> Self {
        self.contests.push(contest);
        self
    }

    /// Leaves the match without a squad so tests can assign it themselves
    pub fn without_squad(mut self) -> Self {
        self.assign_squad = false;
        self
    }

    pub async fn build(self) -> TestSetup {
        let directory = Arc::new(
            DirectoryBuilder::new(MATCH_ID)
                .with_players_per_side(self.players_per_side)
                .build(),
        );
        let squads = Arc::new(InMemorySquadRepository::new());
        let contests = Arc::new(InMemoryContestRepository::with_contests(self.contests));

        let state = AppState::new(
            contests.clone(),
            squads.clone(),
            directory.clone(),
            TokenConfig::new(TEST_SECRET),
        );

        let setup = TestSetup {
            state,
            directory,
            squads,
            contests,
        };

        if self.assign_squad {
            setup.assigner().assign(MATCH_ID).await.unwrap();
        }

        setup
    }
}
