// API Server Binary Entry Point
//
// Purpose: Serve the legal-code query API, browser UI and static assets
// Usage: cargo run --bin api_server

use thai_law_api::{AppState, ServerConfig, create_router};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (structured logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    // Default log level: info for our crate, warn for others
                    "thai_law_api=info,tower_http=debug,axum=debug,warn".into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting API server...");

    // Configuration from environment variables
    let config = ServerConfig::from_env();

    tracing::info!("Configuration:");
    tracing::info!("  DATA_DIR: {}", config.data_dir.display());
    tracing::info!("  STATIC_DIR: {}", config.static_dir.display());
    tracing::info!("  CATEGORIES_PATH: {}", config.categories_path.display());
    tracing::info!("  PORT: {}", config.port);

    let state = AppState::new(&config)?;
    tracing::info!("Application state initialized successfully");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://localhost:{}/", config.port);
    tracing::info!("  Query API:   http://localhost:{}/api?code=civil_and_commercial_code", config.port);
    tracing::info!("  Dataset file: http://localhost:{}/api/criminal_code.json", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}
