//! Issuance error types.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, IssuanceError>;

/// Failures talking to the artifact store or the issuer.
#[derive(Debug, Error)]
pub enum IssuanceError {
    #[error("failed to upload proof artifact: {0}")]
    Upload(String),

    #[error("failed to fetch proof artifact: {0}")]
    Fetch(String),

    #[error("failed to mint token: {0}")]
    Mint(String),

    #[error("token lookup failed: {0}")]
    Lookup(String),

    #[error("token not found: {0}")]
    TokenNotFound(u64),

    #[error("proof not found: {0}")]
    ProofNotFound(String),

    #[error(transparent)]
    Core(#[from] attention_core::Error),
}

impl IssuanceError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::TokenNotFound(_) | Self::ProofNotFound(_) => "ISSUE_002",
            Self::Core(e) => e.error_code(),
            _ => "ISSUE_001",
        }
    }

    /// Collaborator failures surface as bad gateway.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::TokenNotFound(_) | Self::ProofNotFound(_) => 404,
            Self::Core(e) => e.http_status(),
            _ => 502,
        }
    }
}
