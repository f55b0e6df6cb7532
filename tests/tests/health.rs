//! Tests for health check and metrics endpoints.
//!
//! The health registry is process-wide, so probe transitions are checked
//! inside a single test.

use axum::http::StatusCode;
use integration_tests::{
    fixtures::{self, USER},
    mocks::UnreachableArtifactStore,
    setup::TestContext,
};
use issuance::health::check_collaborators;
use std::sync::Arc;

/// Test /health endpoint returns proper structure
#[tokio::test]
async fn test_health_endpoint_structure() {
    let ctx = TestContext::new();
    let server = ctx.server();
    fixtures::start_session(&server, USER, "task-1").await;

    let response = server.get("/health").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    let status = body["status"].as_str().unwrap_or("");
    assert!(
        status == "healthy" || status == "degraded" || status == "unhealthy",
        "Status should be 'healthy', 'degraded', or 'unhealthy', got '{}'",
        status
    );
    assert!(body["artifactStoreConnected"].is_boolean());
    assert!(body["issuerConnected"].is_boolean());
    assert_eq!(body["sessionsLive"], 1);
    assert_eq!(body["sessionsActive"], 1);
    assert_eq!(body["report"]["components"].as_array().unwrap().len(), 2);
}

/// Test readiness follows the collaborator probes
#[tokio::test]
async fn test_ready_tracks_collaborators() {
    let ctx = TestContext::new();
    let server = ctx.server();

    assert!(check_collaborators(&ctx.pipeline).await);
    server.get("/health/ready").await.assert_status_ok();

    let degraded = TestContext::with_artifact_store(Arc::new(UnreachableArtifactStore::new()));
    assert!(!check_collaborators(&degraded.pipeline).await);
    server
        .get("/health/ready")
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);

    let body: serde_json::Value = server.get("/health").await.json();
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["artifactStoreConnected"], false);
    assert_eq!(body["issuerConnected"], true);

    // Live regardless
    server.get("/health/live").await.assert_status_ok();
}

/// Test /metrics returns a snapshot with lifecycle counters
#[tokio::test]
async fn test_metrics_snapshot() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let session_id = fixtures::start_session(&server, USER, "task-metrics").await;
    ctx.advance_secs(30);
    fixtures::heartbeat(&server, &session_id, USER).await;

    let response = server.get("/metrics").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert!(body["sessions_started"].as_u64().unwrap() >= 1);
    assert!(body["heartbeats_received"].as_u64().unwrap() >= 1);
    assert!(body["sessions_live"].is_u64());
    assert!(body["finish_latency_mean_ms"].is_number());
}
