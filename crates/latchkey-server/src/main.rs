//! Latchkey Server: application entry point.

use std::sync::Arc;

use latchkey_db::DbManager;
use latchkey_server::{AppState, ServerConfig, create_router};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("latchkey_server=info,latchkey_auth=info,latchkey_db=info,tower_http=info")
        }))
        .json()
        .init();

    info!("Starting Latchkey server v{}", env!("CARGO_PKG_VERSION"));

    let config = ServerConfig::from_env()?;

    let db = DbManager::connect(&config.db).await?;
    latchkey_db::run_migrations(db.client()).await?;

    let state = Arc::new(AppState::new(db.client().clone(), config.auth.clone()));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    info!(address = %config.bind_address(), "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Latchkey server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }
    info!("Shutdown signal received");
}
