//! Health check endpoints.

use axum::{extract::State, http::StatusCode};

use crate::state::AppState;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Probes the selected backend's `/api/health`. Returns 503 Service
/// Unavailable if it does not answer 2xx.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    let backend = state.backend();
    let base = backend.base_url().await;
    if backend.is_healthy(&base).await {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
