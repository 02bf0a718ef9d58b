use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use volley_fantasy::{
    auth::TokenConfig,
    build_router,
    config::AppConfig,
    contest::{InMemoryContestRepository, PostgresContestRepository},
    directory::{InMemoryDirectoryRepository, PostgresDirectoryRepository},
    seed::SeedData,
    shared::AppState,
    squad::repository::{InMemorySquadRepository, PostgresSquadRepository},
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "volley_fantasy=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting fantasy volleyball contest service");

    let config = AppConfig::from_env()?;
    let app_state = build_state(&config).await?;
    let app = build_router(app_state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("Server running on http://{}", address);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Wires PostgreSQL repositories when a database is configured, in-memory ones otherwise
async fn build_state(config: &AppConfig) -> Result<AppState, Box<dyn std::error::Error>> {
    let token_config = TokenConfig::new(config.jwt_secret.clone());

    if let Some(database_url) = &config.database_url {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .connect(database_url)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to connect to database");
                e
            })?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Database migrations applied");

        if config.seed_file.is_some() {
            warn!("SEED_FILE is ignored when DATABASE_URL is set");
        }

        return Ok(AppState::new(
            Arc::new(PostgresContestRepository::new(pool.clone())),
            Arc::new(PostgresSquadRepository::new(pool.clone())),
            Arc::new(PostgresDirectoryRepository::new(pool)),
            token_config,
        ));
    }

    let (directory, contests) = match &config.seed_file {
        Some(path) => SeedData::from_file(path)?.into_repositories()?,
        None => (
            InMemoryDirectoryRepository::new(),
            InMemoryContestRepository::new(),
        ),
    };
    info!("Using in-memory repositories");

    Ok(AppState::new(
        Arc::new(contests),
        Arc::new(InMemorySquadRepository::new()),
        Arc::new(directory),
        token_config,
    ))
}
