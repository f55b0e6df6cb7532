//! Upload-then-mint for one accepted session.

use attention_core::{ConfigError, ProofRecord};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use telemetry::metrics::metrics;
use tracing::{info, warn};

use crate::artifact::{ArtifactStore, IpfsArtifactStore};
use crate::config::{IpfsProvider, IssuanceConfig, IssuerProvider};
use crate::issuer::{build_relay_issuer, TokenIssuer};
use crate::mock::{MockArtifactStore, MockIssuer};

/// A proof that made it all the way to a token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuanceReceipt {
    pub ipfs_hash: String,
    pub token_id: u64,
    pub transaction_hash: String,
    pub block_number: u64,
}

/// Where issuance stopped. `ipfs_hash` is set when the upload succeeded
/// and only the mint failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuanceFailure {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipfs_hash: Option<String>,
    pub error: String,
}

/// Publishes proofs and mints tokens for them.
#[derive(Clone)]
pub struct ProofPipeline {
    artifacts: Arc<dyn ArtifactStore>,
    issuer: Arc<dyn TokenIssuer>,
}

impl ProofPipeline {
    pub fn new(artifacts: Arc<dyn ArtifactStore>, issuer: Arc<dyn TokenIssuer>) -> Self {
        Self { artifacts, issuer }
    }

    /// In-memory collaborators on both sides.
    pub fn mock() -> Self {
        Self::new(Arc::new(MockArtifactStore::new()), Arc::new(MockIssuer::new()))
    }

    /// Builds the configured collaborators. Mock providers are allowed but
    /// announced loudly.
    pub fn from_config(config: &IssuanceConfig) -> Result<Self, ConfigError> {
        let artifacts: Arc<dyn ArtifactStore> = match config.ipfs.provider()? {
            IpfsProvider::Mock => {
                warn!("IPFS provider is mock; proofs are kept in memory only");
                Arc::new(MockArtifactStore::new())
            }
            _ => Arc::new(IpfsArtifactStore::new(&config.ipfs)?),
        };

        let issuer: Arc<dyn TokenIssuer> = match config.issuer.provider()? {
            IssuerProvider::Mock => {
                warn!("Issuer provider is mock; tokens are not minted on chain");
                Arc::new(MockIssuer::new())
            }
            IssuerProvider::Relay { .. } => Arc::new(build_relay_issuer(&config.issuer)?),
        };

        info!(
            artifact_store = artifacts.name(),
            issuer = issuer.name(),
            "Proof pipeline configured"
        );
        Ok(Self::new(artifacts, issuer))
    }

    pub fn artifacts(&self) -> &Arc<dyn ArtifactStore> {
        &self.artifacts
    }

    pub fn issuer(&self) -> &Arc<dyn TokenIssuer> {
        &self.issuer
    }

    /// Uploads the proof, then mints a token pointing at it.
    pub async fn issue(&self, proof: &ProofRecord) -> Result<IssuanceReceipt, IssuanceFailure> {
        let started = Instant::now();
        let m = metrics();

        let ipfs_hash = match self.artifacts.upload_proof(proof).await {
            Ok(cid) => {
                m.proofs_uploaded.inc();
                cid
            }
            Err(e) => {
                m.proof_upload_errors.inc();
                warn!(session_id = %proof.session_id, error = %e, "Proof upload failed");
                return Err(IssuanceFailure {
                    ipfs_hash: None,
                    error: e.to_string(),
                });
            }
        };

        let receipt = match self
            .issuer
            .mint(&proof.user_address, &proof.task_id, &ipfs_hash)
            .await
        {
            Ok(receipt) => {
                m.tokens_minted.inc();
                receipt
            }
            Err(e) => {
                m.mint_errors.inc();
                warn!(
                    session_id = %proof.session_id,
                    ipfs_hash = %ipfs_hash,
                    error = %e,
                    "Token mint failed"
                );
                return Err(IssuanceFailure {
                    ipfs_hash: Some(ipfs_hash),
                    error: e.to_string(),
                });
            }
        };

        m.issuance_latency_ms
            .observe(started.elapsed().as_millis() as u64);

        info!(
            session_id = %proof.session_id,
            ipfs_hash = %ipfs_hash,
            token_id = receipt.token_id,
            "Proof issued"
        );

        Ok(IssuanceReceipt {
            ipfs_hash,
            token_id: receipt.token_id,
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
        })
    }
}
