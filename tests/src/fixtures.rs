//! Test fixtures and request builders.

use axum_test::TestServer;
use serde_json::Value;

/// A well-formed mixed-case account address.
pub const USER: &str = "0x742d35Cc6634C0532925a3b844Bc454e4438f44e";

/// A second, unrelated account address.
pub const OTHER_USER: &str = "0x8ba1f109551bD432803012645Ac136ddd64DBA72";

pub fn start_body(user: &str, task_id: &str) -> Value {
    serde_json::json!({ "userAddress": user, "taskId": task_id })
}

pub fn heartbeat_body(session_id: &str, user: &str) -> Value {
    serde_json::json!({ "sessionId": session_id, "userAddress": user })
}

pub fn end_body(session_id: &str, user: &str) -> Value {
    serde_json::json!({ "sessionId": session_id, "userAddress": user })
}

/// Starts a session and returns its id.
pub async fn start_session(server: &TestServer, user: &str, task_id: &str) -> String {
    let response = server
        .post("/api/attention/start")
        .json(&start_body(user, task_id))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    body["sessionId"]
        .as_str()
        .expect("sessionId should be a string")
        .to_string()
}

/// Sends one heartbeat and returns the response body.
pub async fn heartbeat(server: &TestServer, session_id: &str, user: &str) -> Value {
    let response = server
        .post("/api/attention/heartbeat")
        .json(&heartbeat_body(session_id, user))
        .await;
    response.assert_status_ok();
    response.json()
}
