//! HTTP surface beside the WebSocket relay: operational endpoints only.

pub mod handlers;

use axum::Router;

use crate::app_state::AppState;

/// Builds the router for all plain HTTP endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new().merge(handlers::system::routes())
}
