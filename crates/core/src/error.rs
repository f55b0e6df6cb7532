//! Unified error types for the attention engine.
//!
//! Error codes:
//! - SESSION_001-005: Session lifecycle errors
//! - VALID_001: Request validation errors
//! - ISSUE_001: Proof issuance collaborator errors
//! - INTERNAL_001: Everything else

use thiserror::Error;
use uuid::Uuid;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Session lifecycle error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionErrorCode {
    /// SESSION_001: Unknown session id
    NotFound,
    /// SESSION_002: Session already ended
    InvalidState,
    /// SESSION_003: Caller identity does not own the session
    IdentityMismatch,
    /// SESSION_004: Finish attempted before the minimum attention time
    DurationTooShort,
    /// SESSION_005: Heartbeat pattern scored as bot-like
    BotLikeRejected,
}

impl SessionErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound => "SESSION_001",
            Self::InvalidState => "SESSION_002",
            Self::IdentityMismatch => "SESSION_003",
            Self::DurationTooShort => "SESSION_004",
            Self::BotLikeRejected => "SESSION_005",
        }
    }

    /// Get the HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::InvalidState => 400,
            Self::IdentityMismatch => 403,
            Self::DurationTooShort => 400,
            Self::BotLikeRejected => 400,
        }
    }
}

/// Unified error type for the attention engine.
#[derive(Debug, Error)]
pub enum Error {
    #[error("session not found: {0}")]
    NotFound(Uuid),

    #[error("session already ended: {0}")]
    InvalidState(Uuid),

    #[error("user address does not match session")]
    IdentityMismatch,

    /// Retryable: the session stays active.
    #[error(
        "attention duration too short. Minimum: {min_duration_ms}ms, Actual: {duration_ms}ms"
    )]
    DurationTooShort {
        duration_ms: i64,
        min_duration_ms: u64,
    },

    /// Terminal: a new session must be started.
    #[error("attention pattern detected as bot-like (score {bot_score:.2})")]
    BotLikeRejected {
        bot_score: f64,
        duration_ms: i64,
        heartbeat_count: usize,
    },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Lifecycle code for session errors, `None` for the rest.
    pub fn session_code(&self) -> Option<SessionErrorCode> {
        match self {
            Self::NotFound(_) => Some(SessionErrorCode::NotFound),
            Self::InvalidState(_) => Some(SessionErrorCode::InvalidState),
            Self::IdentityMismatch => Some(SessionErrorCode::IdentityMismatch),
            Self::DurationTooShort { .. } => Some(SessionErrorCode::DurationTooShort),
            Self::BotLikeRejected { .. } => Some(SessionErrorCode::BotLikeRejected),
            _ => None,
        }
    }

    /// Get the error code string.
    pub fn error_code(&self) -> &'static str {
        match self.session_code() {
            Some(code) => code.code(),
            None => match self {
                Self::Validation(_) | Self::Serialization(_) => "VALID_001",
                _ => "INTERNAL_001",
            },
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status(&self) -> u16 {
        match self.session_code() {
            Some(code) => code.http_status(),
            None => match self {
                Self::Validation(_) | Self::Serialization(_) => 400,
                _ => 500,
            },
        }
    }
}
