//! Tests for the token lookup endpoints.

use axum::http::StatusCode;
use integration_tests::{
    fixtures::{self, USER},
    setup::TestContext,
};

/// Runs one accepted session and returns the token id it was issued.
async fn issue_token(ctx: &TestContext, server: &axum_test::TestServer, task_id: &str) -> u64 {
    let session_id = fixtures::start_session(server, USER, task_id).await;
    ctx.advance_secs(30);
    fixtures::heartbeat(server, &session_id, USER).await;
    ctx.advance_secs(30);

    let response = server
        .post("/api/attention/end")
        .json(&fixtures::end_body(&session_id, USER))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    body["issuance"]["tokenId"]
        .as_u64()
        .expect("session should have been issued a token")
}

#[tokio::test]
async fn test_token_lookup() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let token_id = issue_token(&ctx, &server, "task-lookup").await;

    let response = server.get(&format!("/api/poa/{}", token_id)).await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["tokenId"], token_id);
    assert_eq!(body["data"]["userAddress"], USER.to_lowercase());
    assert_eq!(body["data"]["taskId"], "task-lookup");
    assert!(body["data"]["ipfsHash"].as_str().unwrap().starts_with("bafymock"));

    // Served from cache the second time
    let again: serde_json::Value = server
        .get(&format!("/api/poa/{}", token_id))
        .await
        .json();
    assert_eq!(again["data"], body["data"]);
}

#[tokio::test]
async fn test_unknown_token_returns_404() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server.get("/api/poa/999").await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "ISSUE_002");
}

#[tokio::test]
async fn test_non_numeric_token_returns_400() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server.get("/api/poa/abc").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "VALID_001");
}

#[tokio::test]
async fn test_ownership_lookup() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let path = format!("/api/poa/user/{}/task/task-owned", USER);
    let body: serde_json::Value = server.get(&path).await.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["exists"], false);
    assert!(body["tokenId"].is_null());

    let token_id = issue_token(&ctx, &server, "task-owned").await;

    let response = server.get(&path).await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["exists"], true);
    assert_eq!(body["tokenId"], token_id);
}

#[tokio::test]
async fn test_eligibility() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .get(&format!("/api/poa/user/{}/eligibility", USER))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["canMint"], true);
    assert_eq!(body["timeRemaining"], 0);

    let response = server.get("/api/poa/user/0xnope/eligibility").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "VALID_001");
}

#[tokio::test]
async fn test_proof_lookup_returns_pinned_record() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let token_id = issue_token(&ctx, &server, "task-proof").await;

    let token: serde_json::Value = server.get(&format!("/api/poa/{}", token_id)).await.json();
    let cid = token["data"]["ipfsHash"].as_str().unwrap().to_string();

    let response = server.get(&format!("/api/poa/proof/{}", cid)).await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["cid"], cid.as_str());
    assert_eq!(body["data"]["userAddress"], USER.to_lowercase());
    assert_eq!(body["data"]["taskId"], "task-proof");
    assert_eq!(body["data"]["duration"], 60_000);
    assert_eq!(body["data"]["heartbeatCount"], 1);
}

#[tokio::test]
async fn test_unknown_proof_returns_404() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server.get("/api/poa/proof/bafymissing").await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "ISSUE_002");

    let response = server.get("/api/poa/proof/not-a-cid!").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "VALID_001");
}
