//! Tests for error handling in the attention endpoints.
//!
//! These tests verify that the API returns correct error codes for various failure scenarios.

use axum::http::StatusCode;
use integration_tests::{
    fixtures::{self, OTHER_USER, USER},
    setup::TestContext,
};

/// Test unknown session returns SESSION_001
#[tokio::test]
async fn test_unknown_session_returns_404() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let unknown = uuid::Uuid::new_v4().to_string();
    let response = server
        .post("/api/attention/heartbeat")
        .json(&fixtures::heartbeat_body(&unknown, USER))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "SESSION_001");

    let response = server
        .post("/api/attention/end")
        .json(&fixtures::end_body("definitely-not-a-session", USER))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "SESSION_001");
}

/// Test a different caller is refused with SESSION_003
#[tokio::test]
async fn test_identity_mismatch_returns_403() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let session_id = fixtures::start_session(&server, USER, "task-1").await;

    let response = server
        .post("/api/attention/heartbeat")
        .json(&fixtures::heartbeat_body(&session_id, OTHER_USER))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "SESSION_003");

    ctx.advance_secs(30);
    fixtures::heartbeat(&server, &session_id, USER).await;
    ctx.advance_secs(30);
    let response = server
        .post("/api/attention/end")
        .json(&fixtures::end_body(&session_id, OTHER_USER))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    // The owner can still finish
    let response = server
        .post("/api/attention/end")
        .json(&fixtures::end_body(&session_id, USER))
        .await;
    response.assert_status_ok();
}

/// Test a second finish returns SESSION_002 and mints nothing more
#[tokio::test]
async fn test_double_finish_returns_400() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let session_id = fixtures::start_session(&server, USER, "task-once").await;
    ctx.advance_secs(30);
    fixtures::heartbeat(&server, &session_id, USER).await;
    ctx.advance_secs(30);

    server
        .post("/api/attention/end")
        .json(&fixtures::end_body(&session_id, USER))
        .await
        .assert_status_ok();

    let response = server
        .post("/api/attention/end")
        .json(&fixtures::end_body(&session_id, USER))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "SESSION_002");

    assert_eq!(ctx.issuer.minted(), 1);
}

/// Test heartbeats after finish return SESSION_002
#[tokio::test]
async fn test_heartbeat_after_finish_returns_400() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let session_id = fixtures::start_session(&server, USER, "task-late").await;
    ctx.advance_secs(30);
    fixtures::heartbeat(&server, &session_id, USER).await;
    ctx.advance_secs(30);

    server
        .post("/api/attention/end")
        .json(&fixtures::end_body(&session_id, USER))
        .await
        .assert_status_ok();

    let response = server
        .post("/api/attention/heartbeat")
        .json(&fixtures::heartbeat_body(&session_id, USER))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "SESSION_002");
}

/// Test a silent minute-long session is rejected as bot-like with SESSION_005
#[tokio::test]
async fn test_bot_like_session_returns_400() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let session_id = fixtures::start_session(&server, USER, "task-bot").await;
    ctx.advance_secs(61);

    let response = server
        .post("/api/attention/end")
        .json(&fixtures::end_body(&session_id, USER))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "SESSION_005");
    assert_eq!(body["botScore"], 0.8);
    assert_eq!(body["duration"], 61_000);

    // Rejection is terminal
    let response = server
        .post("/api/attention/end")
        .json(&fixtures::end_body(&session_id, USER))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "SESSION_002");

    assert_eq!(ctx.issuer.minted(), 0);
    assert!(ctx.artifacts.is_empty());
}

/// Test malformed addresses return VALID_001
#[tokio::test]
async fn test_invalid_address_returns_400() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let malformed = [
        "",
        "0x123",
        "742d35Cc6634C0532925a3b844Bc454e4438f44e",
        "0xZZZd35Cc6634C0532925a3b844Bc454e4438f44e",
    ];
    for address in malformed {
        let response = server
            .post("/api/attention/start")
            .json(&fixtures::start_body(address, "task-1"))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["code"], "VALID_001", "address {:?}", address);
        assert!(body["details"].is_array());
    }

    assert!(ctx.store.is_empty());
}

/// Test missing and oversized task ids return VALID_001
#[tokio::test]
async fn test_invalid_task_id_returns_400() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post("/api/attention/start")
        .json(&serde_json::json!({ "userAddress": USER }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "VALID_001");

    let response = server
        .post("/api/attention/start")
        .json(&fixtures::start_body(USER, &"t".repeat(257)))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .post("/api/attention/start")
        .json(&fixtures::start_body(USER, &"t".repeat(256)))
        .await;
    response.assert_status_ok();
}

/// Test invalid JSON returns VALID_001
#[tokio::test]
async fn test_invalid_json_returns_400() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post("/api/attention/start")
        .content_type("application/json")
        .bytes("not json at all".into())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "VALID_001");
}

/// Test an unrepresentable client timestamp returns VALID_001
#[tokio::test]
async fn test_out_of_range_timestamp_returns_400() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let session_id = fixtures::start_session(&server, USER, "task-ts").await;

    let response = server
        .post("/api/attention/heartbeat")
        .json(&serde_json::json!({
            "sessionId": session_id,
            "userAddress": USER,
            "timestamp": i64::MAX,
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "VALID_001");

    let session = ctx.store.get(session_id.parse().unwrap()).unwrap();
    assert_eq!(session.heartbeat_count(), 0);
}
