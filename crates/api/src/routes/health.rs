//! Health check and metrics endpoints.

use axum::{extract::State, http::StatusCode, Json};
use telemetry::{health, metrics, MetricsSnapshot};

use crate::response::HealthResponse;
use crate::state::AppState;

/// GET /health - Full health check.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let registry = health();
    let report = registry.report();
    let store = state.lifecycle.store();

    Json(HealthResponse {
        success: true,
        status: report.status.as_str().to_string(),
        artifact_store_connected: registry.artifact_store.is_healthy(),
        issuer_connected: registry.issuer.is_healthy(),
        sessions_live: store.len(),
        sessions_active: store.active_count(),
        report,
    })
}

/// GET /health/ready - Readiness probe (proofs can be issued).
pub async fn ready_handler() -> StatusCode {
    if health().is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /health/live - Liveness probe (service is running).
pub async fn live_handler() -> StatusCode {
    if health().is_alive() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /metrics
pub async fn metrics_handler(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    let m = metrics();
    let store = state.lifecycle.store();
    m.sessions_live.set(store.len() as u64);
    m.sessions_active.set(store.active_count() as u64);
    Json(m.snapshot())
}
