//! API route configuration.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::state::AppState;

/// Creates the API router with all routes configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))

        // Engine status and control
        .route("/server/status", post(handlers::get_status))
        .route("/server/stop", post(handlers::stop_service))
        .route("/server/restart", post(handlers::restart_service))

        // Versions and installs
        .route("/server/versions/:kind", post(handlers::get_versions))
        .route("/server/install/:kind/:version", post(handlers::install_asset))

        // Exports
        .route("/server/logs/:count", post(handlers::tail_logs))
        .route("/server/database", get(handlers::export_database))
        .route("/server/config", post(handlers::export_config))

        .with_state(state)
}
