//! # TaskDeck API Server
//!
//! This is the main API server for TaskDeck, a multi-user task tracker.
//!
//! ## Architecture
//!
//! The API server is built with Axum and provides:
//! - User registration and login (Argon2id hashes, bearer tokens)
//! - Per-user task CRUD with filtering, sorting and pagination
//! - Soft-delete, a due-soon view and per-user statistics
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=sqlite://taskdeck.db JWT_SECRET=$(openssl rand -hex 32) \
//!     cargo run -p taskdeck-api
//! ```

use taskdeck_api::{
    app::{build_router, AppState},
    config::Config,
};
use taskdeck_shared::db::{
    migrations::run_migrations,
    pool::{close_pool, create_pool, DatabaseConfig},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskdeck_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "TaskDeck API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    // Load configuration
    let config = Config::from_env()?;
    let bind_address = config.bind_address();

    // Initialize database pool and apply migrations before serving
    let db_config = DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..DatabaseConfig::default()
    };
    let pool = create_pool(db_config).await?;
    run_migrations(&pool).await?;

    // Build the application
    let state = AppState::new(pool.clone(), config);
    let app = build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown signal received, exiting...");
    close_pool(pool).await;

    Ok(())
}

/// Resolves when ctrl-c is received
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
    }
}
