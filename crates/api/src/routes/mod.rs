//! API routes.

pub mod attention;
pub mod health;
pub mod poa;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::state::AppState;

/// Creates the API router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/attention/start", post(attention::start_handler))
        .route("/api/attention/heartbeat", post(attention::heartbeat_handler))
        .route("/api/attention/end", post(attention::end_handler))
        .route("/api/poa/:token_id", get(poa::token_handler))
        .route("/api/poa/proof/:cid", get(poa::proof_handler))
        .route(
            "/api/poa/user/:user_address/task/:task_id",
            get(poa::ownership_handler),
        )
        .route(
            "/api/poa/user/:user_address/eligibility",
            get(poa::eligibility_handler),
        )
        .route("/health", get(health::health_handler))
        .route("/health/ready", get(health::ready_handler))
        .route("/health/live", get(health::live_handler))
        .route("/metrics", get(health::metrics_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(CompressionLayer::new()),
        )
        .with_state(state)
}
