//! Attention session endpoints.
//!
//! Start, heartbeat and end map one-to-one onto the lifecycle manager.
//! An accepted end also runs proof issuance; a failed issuance does not
//! undo the acceptance.

use attention_core::limits::MAX_TASK_ID_LEN;
use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Instant;
use telemetry::metrics;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use crate::extractors::{validate_address, validate_not_blank, ValidatedJson};
use crate::response::{ApiError, EndResponse, HeartbeatResponse, IssuanceOutcome, StartResponse};
use crate::state::AppState;

// The validator derive requires a `u64` bound; same value as the core limit.
const MAX_TASK_ID_LEN_U64: u64 = MAX_TASK_ID_LEN as u64;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    #[serde(default)]
    #[validate(custom(function = "validate_address"))]
    pub user_address: String,
    #[serde(default)]
    #[validate(
        length(max = MAX_TASK_ID_LEN_U64, message = "taskId is too long"),
        custom(function = "validate_not_blank")
    )]
    pub task_id: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatRequest {
    #[serde(default)]
    #[validate(custom(function = "validate_not_blank"))]
    pub session_id: String,
    #[serde(default)]
    #[validate(custom(function = "validate_address"))]
    pub user_address: String,
    /// Client clock, epoch milliseconds
    pub timestamp: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EndRequest {
    #[serde(default)]
    #[validate(custom(function = "validate_not_blank"))]
    pub session_id: String,
    #[serde(default)]
    #[validate(custom(function = "validate_address"))]
    pub user_address: String,
}

/// Unparseable ids cannot name a session.
fn parse_session_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::session_not_found())
}

fn parse_client_timestamp(ms: Option<i64>) -> Result<Option<DateTime<Utc>>, ApiError> {
    match ms {
        None => Ok(None),
        Some(ms) => DateTime::from_timestamp_millis(ms)
            .map(Some)
            .ok_or_else(|| ApiError::bad_request("timestamp is out of range")),
    }
}

/// POST /api/attention/start
pub async fn start_handler(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<StartRequest>,
) -> Result<Json<StartResponse>, ApiError> {
    let started = state.lifecycle.start(&req.user_address, req.task_id.trim());

    let m = metrics();
    m.sessions_started.inc();
    m.sessions_live.set(state.lifecycle.store().len() as u64);

    Ok(Json(StartResponse {
        success: true,
        session_id: started.session_id,
        started_at: started.started_at.timestamp_millis(),
    }))
}

/// POST /api/attention/heartbeat
pub async fn heartbeat_handler(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<HeartbeatRequest>,
) -> Result<Json<HeartbeatResponse>, ApiError> {
    let session_id = parse_session_id(&req.session_id)?;
    let client_timestamp = parse_client_timestamp(req.timestamp)?;

    let ack = state
        .lifecycle
        .heartbeat(session_id, &req.user_address, client_timestamp)
        .inspect_err(|_| metrics().heartbeats_refused.inc())?;
    metrics().heartbeats_received.inc();

    Ok(Json(HeartbeatResponse {
        success: true,
        received: true,
        timestamp: ack.timestamp.timestamp_millis(),
        heartbeat_count: ack.heartbeat_count,
    }))
}

/// POST /api/attention/end
pub async fn end_handler(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<EndRequest>,
) -> Result<Json<EndResponse>, ApiError> {
    let start = Instant::now();
    let session_id = parse_session_id(&req.session_id)?;
    let m = metrics();

    let report = match state.lifecycle.finish(session_id, &req.user_address) {
        Ok(report) => report,
        Err(e) => {
            match &e {
                attention_core::Error::DurationTooShort { .. } => m.finishes_too_short.inc(),
                attention_core::Error::BotLikeRejected { .. } => m.sessions_rejected_bot.inc(),
                _ => {}
            }
            return Err(e.into());
        }
    };
    m.sessions_accepted.inc();
    m.finish_latency_ms
        .observe(start.elapsed().as_millis() as u64);

    debug!(session_id = %session_id, "Issuing proof");
    let issuance: IssuanceOutcome = state.pipeline.issue(&report.proof).await.into();
    if let IssuanceOutcome::Failed(failure) = &issuance {
        info!(
            session_id = %session_id,
            error = %failure.error,
            "Session accepted without a token"
        );
    }

    Ok(Json(EndResponse {
        success: true,
        accepted: report.accepted,
        session_id: report.session_id,
        duration: report.duration_ms,
        heartbeat_count: report.heartbeat_count,
        bot_score: report.bot_score,
        issuance,
    }))
}
