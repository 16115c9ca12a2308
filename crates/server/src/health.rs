use axum::{Json, Router, routing::get};
use http::StatusCode;

#[derive(Debug, serde::Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub(crate) enum HealthState {
    /// The process is up and serving.
    Healthy,
}

/// Liveness check: answers as long as the process serves HTTP.
pub(crate) async fn health() -> (StatusCode, Json<HealthState>) {
    (StatusCode::OK, Json(HealthState::Healthy))
}

/// Liveness routes for container runtimes, at `/` and `/health`.
pub(crate) fn router() -> Router {
    Router::new().route("/", get(health)).route("/health", get(health))
}
