//! courier-relay server entry point.
//!
//! Loads configuration, initializes tracing, and serves the WebSocket
//! relay until Ctrl-C.

use tracing_subscriber::EnvFilter;

use courier_relay::app_state::AppState;
use courier_relay::config::{LogFormat, RelayConfig};
use courier_relay::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = RelayConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }
    tracing::info!(
        addr = %config.listen_addr,
        heartbeat_secs = config.heartbeat_interval_secs,
        idle_timeout_secs = config.idle_timeout_secs,
        "starting courier-relay"
    );

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    let state = AppState::new(config);

    server::serve(listener, state, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for shutdown signal");
        }
        tracing::info!("received shutdown signal");
    })
    .await?;

    Ok(())
}
