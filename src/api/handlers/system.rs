//! System endpoints: health check.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::app_state::AppState;

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"healthy"` while the process serves requests.
    pub status: String,
    /// RFC 3339 server time.
    pub timestamp: String,
    /// Crate version.
    pub version: String,
    /// Attached sockets.
    pub connections: usize,
    /// Registered drivers.
    pub drivers: usize,
    /// Registered monitors.
    pub monitors: usize,
    /// Monitors with a subscription.
    pub subscriptions: usize,
}

/// `GET /health`: service health status and relay occupancy.
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let stats = state.hub.stats().await;
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            connections: stats.connections,
            drivers: stats.drivers,
            monitors: stats.monitors,
            subscriptions: stats.subscriptions,
        }),
    )
}

/// System routes mounted at the root level.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_handler))
}
