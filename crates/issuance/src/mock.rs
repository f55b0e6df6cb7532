//! In-memory collaborators for development and tests.

use async_trait::async_trait;
use attention_core::ProofRecord;
use parking_lot::Mutex;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::debug;

use crate::artifact::ArtifactStore;
use crate::error::{IssuanceError, Result};
use crate::issuer::{MintEligibility, MintReceipt, TokenIssuer, TokenOwnership, TokenRecord};

/// Keeps proof documents in memory under a hash-derived content id.
#[derive(Default)]
pub struct MockArtifactStore {
    documents: Mutex<HashMap<String, serde_json::Value>>,
    should_fail: AtomicBool,
}

impl MockArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every upload fail until reset.
    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.documents.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.lock().is_empty()
    }
}

fn mock_cid(body: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    body.hash(&mut hasher);
    format!("bafymock{:016x}", hasher.finish())
}

#[async_trait]
impl ArtifactStore for MockArtifactStore {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn upload_proof(&self, proof: &ProofRecord) -> Result<String> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(IssuanceError::Upload("mock artifact store failure".into()));
        }

        let body = proof.to_json_pretty()?;
        let cid = mock_cid(&body);
        let document = serde_json::to_value(proof).map_err(attention_core::Error::from)?;
        self.documents.lock().insert(cid.clone(), document);

        debug!(cid = %cid, session_id = %proof.session_id, "Stored mock proof");
        Ok(cid)
    }

    async fn fetch_proof(&self, cid: &str) -> Result<serde_json::Value> {
        self.documents
            .lock()
            .get(cid)
            .cloned()
            .ok_or_else(|| IssuanceError::ProofNotFound(cid.to_string()))
    }

    async fn health_check(&self) -> bool {
        !self.should_fail.load(Ordering::SeqCst)
    }
}

/// Issues sequential token ids and remembers them in memory.
pub struct MockIssuer {
    tokens: Mutex<HashMap<u64, TokenRecord>>,
    next_id: AtomicU64,
    next_block: AtomicU64,
    should_fail: AtomicBool,
}

impl Default for MockIssuer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockIssuer {
    pub fn new() -> Self {
        Self {
            tokens: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            next_block: AtomicU64::new(1_000),
            should_fail: AtomicBool::new(false),
        }
    }

    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    pub fn minted(&self) -> usize {
        self.tokens.lock().len()
    }
}

#[async_trait]
impl TokenIssuer for MockIssuer {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn mint(
        &self,
        user_address: &str,
        task_id: &str,
        ipfs_hash: &str,
    ) -> Result<MintReceipt> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(IssuanceError::Mint("mock issuer failure".into()));
        }

        let token_id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let block_number = self.next_block.fetch_add(1, Ordering::SeqCst);
        let record = TokenRecord {
            token_id,
            user_address: user_address.to_lowercase(),
            task_id: task_id.to_string(),
            timestamp: chrono::Utc::now().timestamp(),
            ipfs_hash: ipfs_hash.to_string(),
        };
        self.tokens.lock().insert(token_id, record);

        Ok(MintReceipt {
            token_id,
            transaction_hash: format!("0x{:064x}", token_id),
            block_number,
        })
    }

    async fn token(&self, token_id: u64) -> Result<TokenRecord> {
        self.tokens
            .lock()
            .get(&token_id)
            .cloned()
            .ok_or(IssuanceError::TokenNotFound(token_id))
    }

    async fn ownership(&self, user_address: &str, task_id: &str) -> Result<TokenOwnership> {
        let user = user_address.to_lowercase();
        let token_id = self
            .tokens
            .lock()
            .values()
            .filter(|t| t.user_address == user && t.task_id == task_id)
            .map(|t| t.token_id)
            .min();

        Ok(TokenOwnership {
            exists: token_id.is_some(),
            token_id,
        })
    }

    /// No cooldown in mock mode.
    async fn eligibility(&self, _user_address: &str) -> Result<MintEligibility> {
        Ok(MintEligibility {
            can_mint: true,
            time_remaining: 0,
        })
    }

    async fn health_check(&self) -> bool {
        !self.should_fail.load(Ordering::SeqCst)
    }
}
