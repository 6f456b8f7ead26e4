//! Health check handlers and response types.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use printquote_processing::EngineCheck;
use printquote_worker::QueueStatsSnapshot;
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// `healthy` when the slicing engine can be run, otherwise `unhealthy`.
    pub status: String,
    pub slicer: EngineCheck,
    pub queue: QueueStatsSnapshot,
}

/// Liveness probe - process is running.
pub async fn liveness_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "alive" })),
    )
}

/// Reports whether the slicing engine binary is present and executable,
/// without running a slice.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Slicing engine available", body = HealthResponse),
        (status = 503, description = "Slicing engine missing or not executable", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let slicer = state.slicer.health().await;
    let healthy = slicer.is_usable() && !state.queue.is_shut_down();

    if !slicer.is_usable() {
        tracing::warn!(
            path = %slicer.path,
            status = ?slicer.status,
            "Slicing engine unavailable"
        );
    }

    let response = HealthResponse {
        status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
        slicer,
        queue: state.queue.stats(),
    };
    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}
