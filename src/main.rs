use std::net::SocketAddr;

use jamhub::app_state::AppState;
use jamhub::config::{AppConfig, ConfigError};
use jamhub::logging::{init_logging, LoggingError};
use jamhub::server::router::build_router;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Address parse error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),
    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize logging first
    init_logging()?;
    info!("Starting JamHub portal");

    // Load configuration
    let config = AppConfig::load()?;
    info!("Configuration loaded successfully");

    // Create app state and router
    let state = AppState::new(config.clone());
    let app = build_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.bind_addr.parse()?, config.server.port);
    info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
