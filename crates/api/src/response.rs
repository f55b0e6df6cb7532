//! Standardized API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use issuance::{IssuanceError, IssuanceFailure, IssuanceReceipt, TokenRecord};
use serde::{Deserialize, Serialize};
use telemetry::health::HealthReport;
use uuid::Uuid;

/// POST /api/attention/start
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartResponse {
    pub success: bool,
    pub session_id: Uuid,
    /// Epoch milliseconds
    pub started_at: i64,
}

/// POST /api/attention/heartbeat
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatResponse {
    pub success: bool,
    pub received: bool,
    pub timestamp: i64,
    pub heartbeat_count: usize,
}

/// Outcome of proof issuance for an accepted session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum IssuanceOutcome {
    Issued(IssuanceReceipt),
    Failed(IssuanceFailure),
}

impl From<Result<IssuanceReceipt, IssuanceFailure>> for IssuanceOutcome {
    fn from(result: Result<IssuanceReceipt, IssuanceFailure>) -> Self {
        match result {
            Ok(receipt) => Self::Issued(receipt),
            Err(failure) => Self::Failed(failure),
        }
    }
}

/// POST /api/attention/end
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndResponse {
    pub success: bool,
    pub accepted: bool,
    pub session_id: Uuid,
    /// Milliseconds
    pub duration: i64,
    pub heartbeat_count: usize,
    pub bot_score: f64,
    pub issuance: IssuanceOutcome,
}

/// GET /api/poa/:tokenId
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub success: bool,
    pub data: TokenRecord,
}

/// GET /api/poa/proof/:cid
#[derive(Debug, Serialize, Deserialize)]
pub struct ProofResponse {
    pub success: bool,
    pub cid: String,
    pub data: serde_json::Value,
}

/// GET /api/poa/user/:userAddress/task/:taskId
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnershipResponse {
    pub success: bool,
    pub exists: bool,
    pub token_id: Option<u64>,
}

/// GET /api/poa/user/:userAddress/eligibility
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityResponse {
    pub success: bool,
    pub can_mint: bool,
    pub time_remaining: u64,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub success: bool,
    pub status: String,
    pub artifact_store_connected: bool,
    pub issuer_connected: bool,
    pub sessions_live: usize,
    pub sessions_active: usize,
    pub report: HealthReport,
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_duration: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot_score: Option<f64>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            code: code.into(),
            details: None,
            duration: None,
            min_duration: None,
            bot_score: None,
        }
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = Some(details);
        self
    }
}

/// API error type with stable error codes.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ErrorResponse,
}

impl ApiError {
    pub fn with_code(status: StatusCode, code: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            status,
            response: ErrorResponse::new(msg, code),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::with_code(StatusCode::BAD_REQUEST, "VALID_001", msg)
    }

    pub fn validation(errors: Vec<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            response: ErrorResponse::new("Validation failed", "VALID_001").with_details(errors),
        }
    }

    pub fn session_not_found() -> Self {
        Self::with_code(StatusCode::NOT_FOUND, "SESSION_001", "Session not found")
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_code(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_001", msg)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<attention_core::Error> for ApiError {
    fn from(err: attention_core::Error) -> Self {
        use attention_core::Error;

        let status =
            StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut api_error = match &err {
            Error::NotFound(_) => ApiError::session_not_found(),
            Error::InvalidState(_) => {
                ApiError::with_code(status, err.error_code(), "Session already ended")
            }
            Error::IdentityMismatch => {
                ApiError::with_code(status, err.error_code(), "User address mismatch")
            }
            Error::Validation(msg) => ApiError::bad_request(msg),
            Error::Serialization(_) | Error::Internal(_) => {
                ApiError::internal("Internal server error")
            }
            _ => ApiError::with_code(status, err.error_code(), capitalize(&err.to_string())),
        };

        match err {
            Error::DurationTooShort {
                duration_ms,
                min_duration_ms,
            } => {
                api_error.response.duration = Some(duration_ms);
                api_error.response.min_duration = Some(min_duration_ms);
            }
            Error::BotLikeRejected {
                bot_score,
                duration_ms,
                ..
            } => {
                api_error.response.bot_score = Some(bot_score);
                api_error.response.duration = Some(duration_ms);
            }
            _ => {}
        }
        api_error
    }
}

impl From<IssuanceError> for ApiError {
    fn from(err: IssuanceError) -> Self {
        let code = err.code();
        let status = StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::BAD_GATEWAY);
        match err {
            IssuanceError::Core(core) => core.into(),
            IssuanceError::TokenNotFound(id) => {
                ApiError::with_code(status, code, format!("Token {} not found", id))
            }
            IssuanceError::ProofNotFound(cid) => {
                ApiError::with_code(status, code, format!("Proof {} not found", cid))
            }
            other => ApiError::with_code(status, code, other.to_string()),
        }
    }
}

fn capitalize(msg: &str) -> String {
    let mut chars = msg.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
