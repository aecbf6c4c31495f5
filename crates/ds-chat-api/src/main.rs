//! DashScout chat API server.
//!
//! Serves the dashboard query and metrics pipelines over REST, plus
//! plain inventory endpoints for non-conversational clients.

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use ds_chat_api::config::ApiConfig;
use ds_chat_api::state::AppState;
use ds_chat_api::routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "ds-chat-api starting");

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/etc/dashscout/api.toml".to_string());

    let config = match ApiConfig::from_file(&config_path) {
        Ok(config) => {
            tracing::info!(path = %config_path, "config loaded");
            config
        }
        Err(e) => {
            tracing::warn!(path = %config_path, error = %e, "config not loaded, using defaults");
            ApiConfig::default()
        }
    };

    let state = AppState::from_config(&config)?;
    let app = routes::build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "listening");

    axum::serve(listener, app).await?;

    Ok(())
}
