//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::RelayConfig;
use crate::service::RelayHub;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Relay coordinator shared by every connection task.
    pub hub: Arc<RelayHub>,
    /// Startup configuration.
    pub config: Arc<RelayConfig>,
}

impl AppState {
    /// Builds state with a fresh, empty hub sized from `config`.
    #[must_use]
    pub fn new(config: RelayConfig) -> Self {
        Self {
            hub: Arc::new(RelayHub::new(config.outbound_buffer)),
            config: Arc::new(config),
        }
    }
}
