//! Mock implementations for testing.

use async_trait::async_trait;
use attention_core::ProofRecord;
use issuance::{ArtifactStore, IssuanceError, Result};
use parking_lot::Mutex;
use std::sync::Arc;

/// Artifact store that is always down.
///
/// Records every proof it was asked to upload, so tests can check that
/// an accepted session still reached issuance.
#[derive(Clone, Default)]
pub struct UnreachableArtifactStore {
    attempts: Arc<Mutex<Vec<ProofRecord>>>,
}

impl UnreachableArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Proofs that were offered for upload.
    pub fn attempts(&self) -> Vec<ProofRecord> {
        self.attempts.lock().clone()
    }
}

#[async_trait]
impl ArtifactStore for UnreachableArtifactStore {
    fn name(&self) -> &'static str {
        "unreachable"
    }

    async fn upload_proof(&self, proof: &ProofRecord) -> Result<String> {
        self.attempts.lock().push(proof.clone());
        Err(IssuanceError::Upload("connection refused".into()))
    }

    async fn fetch_proof(&self, cid: &str) -> Result<serde_json::Value> {
        Err(IssuanceError::Fetch(format!("connection refused for {}", cid)))
    }

    async fn health_check(&self) -> bool {
        false
    }
}
