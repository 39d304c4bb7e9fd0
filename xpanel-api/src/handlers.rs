//! API route handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;

use xpanel_core::types::{AssetKind, Outcome, ServerStatus, VersionList};

use crate::dto::HealthResponse;
use crate::error::ApiError;
use crate::state::AppState;

type Result<T> = std::result::Result<T, ApiError>;

fn parse_kind(kind: &str) -> Result<AssetKind> {
    kind.parse::<AssetKind>().map_err(ApiError::from)
}

/// GET /health
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        status_refresh: state.panel.is_refreshing(),
        version_cache: state.panel.version_cache_stats(),
    })
}

/// POST /server/status
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<Outcome<ServerStatus>> {
    Json(state.panel.get_status())
}

/// POST /server/versions/:kind
pub async fn get_versions(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
) -> Result<Json<Outcome<VersionList>>> {
    let kind = parse_kind(&kind)?;
    Ok(Json(state.panel.get_versions(kind).await))
}

/// POST /server/install/:kind/:version
pub async fn install_asset(
    State(state): State<Arc<AppState>>,
    Path((kind, version)): Path<(String, String)>,
) -> Result<Json<Outcome<()>>> {
    let kind = parse_kind(&kind)?;
    info!(%kind, version = %version, "install requested");
    Ok(Json(state.panel.install_asset(kind, &version).await))
}

/// POST /server/stop
pub async fn stop_service(State(state): State<Arc<AppState>>) -> Json<Outcome<()>> {
    Json(state.panel.stop_service().await)
}

/// POST /server/restart
pub async fn restart_service(State(state): State<Arc<AppState>>) -> Json<Outcome<()>> {
    Json(state.panel.restart_service().await)
}

/// POST /server/logs/:count
pub async fn tail_logs(
    State(state): State<Arc<AppState>>,
    Path(count): Path<usize>,
) -> Json<Outcome<Vec<String>>> {
    Json(state.panel.tail_logs(count).await)
}

/// GET /server/database
///
/// Streams the database as an attachment. A failed export answers with the
/// failure outcome as JSON instead.
pub async fn export_database(State(state): State<Arc<AppState>>) -> Response {
    let outcome = state.panel.export_database().await;
    match outcome {
        Outcome {
            success: true,
            obj: Some(export),
            ..
        } => (
            [
                (header::CONTENT_TYPE, "application/octet-stream".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename={}", export.filename),
                ),
            ],
            export.bytes,
        )
            .into_response(),
        outcome => Json(outcome.discard()).into_response(),
    }
}

/// POST /server/config
pub async fn export_config(State(state): State<Arc<AppState>>) -> Json<Outcome<serde_json::Value>> {
    Json(state.panel.export_config().await)
}
