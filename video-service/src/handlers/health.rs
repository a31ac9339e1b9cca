use crate::services::get_metrics;
use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Liveness. Independent of the orchestrator and the filesystem.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "healthy" }))
}

/// Readiness: the configured orchestrator must answer its health check.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.orchestrator.health_check().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(
                orchestrator = state.orchestrator.name(),
                error = %e,
                "Orchestrator not ready"
            );
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

pub async fn metrics_endpoint() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        get_metrics(),
    )
}
