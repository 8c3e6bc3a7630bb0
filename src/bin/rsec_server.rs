use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use rsecurity::api::{self, AppState};
use rsecurity::config::Config;
use rsecurity::persistence::SqliteReportStore;

/// Environment variable overriding `api.api_key`
const API_KEY_ENV: &str = "RSEC_API_KEY";

/// Report API server entry point
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting RSecurity report server...");

    // Load configuration
    let config_path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    let config = if config_path.exists() {
        Config::from_file(&config_path)?
    } else {
        log::warn!("Config file not found, using defaults");
        Config::default()
    };

    let api_key = env::var(API_KEY_ENV)
        .ok()
        .or_else(|| config.api.api_key.clone())
        .filter(|k| !k.is_empty())
        .ok_or_else(|| format!("No API key configured; set {} or api.api_key", API_KEY_ENV))?;

    let store = SqliteReportStore::new(&config.store.db_path)?;
    log::info!("Using report database {:?}", config.store.db_path);

    let app = api::router(AppState::new(Arc::new(store), api_key));

    let listener = tokio::net::TcpListener::bind(&config.api.bind_address).await?;
    log::info!("Listening on {}", config.api.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Report server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    log::info!("Received shutdown signal, gracefully stopping...");
}
