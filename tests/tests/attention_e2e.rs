//! End-to-end attention session flows over HTTP.
//!
//! Sessions run on a manual clock: heartbeats are spaced by advancing the
//! clock, never by sleeping.

use axum::http::StatusCode;
use integration_tests::{
    fixtures::{self, OTHER_USER, USER},
    mocks::UnreachableArtifactStore,
    setup::TestContext,
};
use issuance::TokenIssuer;
use std::sync::Arc;

/// Start, three heartbeats 30s apart, finish at 90s: accepted and issued.
#[tokio::test]
async fn test_full_session_is_accepted_and_issued() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let session_id = fixtures::start_session(&server, USER, "task-1").await;

    for expected_count in 1..=3 {
        ctx.advance_secs(30);
        let body = fixtures::heartbeat(&server, &session_id, USER).await;
        assert_eq!(body["received"], true);
        assert_eq!(body["heartbeatCount"], expected_count);
    }

    let response = server
        .post("/api/attention/end")
        .json(&fixtures::end_body(&session_id, USER))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["accepted"], true);
    assert_eq!(body["sessionId"], session_id.as_str());
    assert_eq!(body["duration"], 90_000);
    assert_eq!(body["heartbeatCount"], 3);
    assert_eq!(body["botScore"], 0.0);

    let issuance = &body["issuance"];
    assert_eq!(issuance["status"], "issued");
    assert_eq!(issuance["tokenId"], 1);
    let cid = issuance["ipfsHash"].as_str().unwrap();
    assert!(cid.starts_with("bafymock"));

    let token = ctx.issuer.token(1).await.unwrap();
    assert_eq!(token.user_address, USER.to_lowercase());
    assert_eq!(token.task_id, "task-1");
    assert_eq!(token.ipfs_hash, cid);
    assert_eq!(ctx.artifacts.len(), 1);
}

/// No heartbeats at 11s scores 0.5, under the 0.7 threshold.
#[tokio::test]
async fn test_silent_short_session_is_accepted_with_penalty() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let session_id = fixtures::start_session(&server, USER, "task-quiet").await;
    ctx.advance_secs(11);

    let response = server
        .post("/api/attention/end")
        .json(&fixtures::end_body(&session_id, USER))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["accepted"], true);
    assert_eq!(body["heartbeatCount"], 0);
    assert_eq!(body["botScore"], 0.5);
}

/// Clockwork heartbeats trip the regularity rule but stay under the threshold.
#[tokio::test]
async fn test_perfectly_periodic_heartbeats_are_penalized() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let session_id = fixtures::start_session(&server, USER, "task-metronome").await;
    for _ in 0..5 {
        ctx.advance_secs(30);
        fixtures::heartbeat(&server, &session_id, USER).await;
    }

    let response = server
        .post("/api/attention/end")
        .json(&fixtures::end_body(&session_id, USER))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["accepted"], true);
    assert_eq!(body["heartbeatCount"], 5);
    assert_eq!(body["botScore"], 0.4);
}

/// A finish that comes too early can be retried on the same session.
#[tokio::test]
async fn test_early_finish_can_be_retried() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let session_id = fixtures::start_session(&server, USER, "task-eager").await;
    ctx.advance_secs(4);

    let response = server
        .post("/api/attention/end")
        .json(&fixtures::end_body(&session_id, USER))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "SESSION_004");
    assert_eq!(body["duration"], 4_000);
    assert_eq!(body["minDuration"], 10_000);

    // Still active: heartbeats are accepted
    fixtures::heartbeat(&server, &session_id, USER).await;

    ctx.advance_secs(30);
    let response = server
        .post("/api/attention/end")
        .json(&fixtures::end_body(&session_id, USER))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["accepted"], true);
    assert_eq!(body["duration"], 34_000);
    assert_eq!(body["heartbeatCount"], 1);
}

/// Address comparison ignores case.
#[tokio::test]
async fn test_identity_is_case_insensitive() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let shouted = USER.to_uppercase().replacen("0X", "0x", 1);
    let session_id = fixtures::start_session(&server, &shouted, "task-case").await;
    ctx.advance_secs(30);
    fixtures::heartbeat(&server, &session_id, &USER.to_lowercase()).await;

    ctx.advance_secs(30);
    let response = server
        .post("/api/attention/end")
        .json(&fixtures::end_body(&session_id, USER))
        .await;
    response.assert_status_ok();
}

/// Client timestamps are echoed back and recorded as sent.
#[tokio::test]
async fn test_heartbeat_echoes_client_timestamp() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let session_id = fixtures::start_session(&server, USER, "task-ts").await;
    let response = server
        .post("/api/attention/heartbeat")
        .json(&serde_json::json!({
            "sessionId": session_id,
            "userAddress": USER,
            "timestamp": 1_700_000_000_000i64,
        }))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["timestamp"], 1_700_000_000_000i64);
    assert_eq!(body["heartbeatCount"], 1);
}

/// Issuance trouble after acceptance does not undo the acceptance.
#[tokio::test]
async fn test_accepted_even_when_upload_fails() {
    let unreachable = Arc::new(UnreachableArtifactStore::new());
    let ctx = TestContext::with_artifact_store(unreachable.clone());
    let server = ctx.server();

    let session_id = fixtures::start_session(&server, USER, "task-offline").await;
    ctx.advance_secs(30);
    fixtures::heartbeat(&server, &session_id, USER).await;
    ctx.advance_secs(30);

    let response = server
        .post("/api/attention/end")
        .json(&fixtures::end_body(&session_id, USER))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["accepted"], true);
    assert_eq!(body["issuance"]["status"], "failed");
    assert!(body["issuance"].get("ipfsHash").is_none());

    let attempts = unreachable.attempts();
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].duration, 60_000);
    assert_eq!(ctx.issuer.minted(), 0);
}

/// A mint failure keeps the pinned cid in the response.
#[tokio::test]
async fn test_mint_failure_reports_cid() {
    let ctx = TestContext::new();
    ctx.set_issuer_failure(true);
    let server = ctx.server();

    let session_id = fixtures::start_session(&server, USER, "task-nomint").await;
    ctx.advance_secs(30);
    fixtures::heartbeat(&server, &session_id, USER).await;
    ctx.advance_secs(30);

    let response = server
        .post("/api/attention/end")
        .json(&fixtures::end_body(&session_id, USER))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["accepted"], true);
    assert_eq!(body["issuance"]["status"], "failed");
    assert!(body["issuance"]["ipfsHash"].as_str().is_some());
}

/// Sessions of different users do not interfere.
#[tokio::test]
async fn test_independent_sessions() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let first = fixtures::start_session(&server, USER, "task-shared").await;
    let second = fixtures::start_session(&server, OTHER_USER, "task-shared").await;
    assert_ne!(first, second);

    ctx.advance_secs(30);
    fixtures::heartbeat(&server, &first, USER).await;
    let body = fixtures::heartbeat(&server, &second, OTHER_USER).await;
    assert_eq!(body["heartbeatCount"], 1);

    assert_eq!(ctx.store.len(), 2);
    assert_eq!(ctx.store.active_count(), 2);
}
