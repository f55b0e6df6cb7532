//! Application state shared across handlers.

use attention_core::LifecycleManager;
use issuance::{ProofPipeline, Result as IssuanceResult, TokenRecord};
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Cache TTL for token lookups (30 seconds).
const TOKEN_CACHE_TTL: Duration = Duration::from_secs(30);

/// Maximum cache entries.
const TOKEN_CACHE_MAX_CAPACITY: u64 = 10_000;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Session lifecycle over the shared store
    pub lifecycle: Arc<LifecycleManager>,
    /// Artifact store and issuer (real or mock)
    pub pipeline: ProofPipeline,
    /// Token id -> token record
    token_cache: Cache<u64, TokenRecord>,
}

impl AppState {
    pub fn new(lifecycle: Arc<LifecycleManager>, pipeline: ProofPipeline) -> Self {
        Self {
            lifecycle,
            pipeline,
            token_cache: Cache::builder()
                .max_capacity(TOKEN_CACHE_MAX_CAPACITY)
                .time_to_live(TOKEN_CACHE_TTL)
                .build(),
        }
    }

    /// Looks up a token through the cache. Misses are not cached.
    pub async fn token(&self, token_id: u64) -> IssuanceResult<TokenRecord> {
        if let Some(cached) = self.token_cache.get(&token_id).await {
            debug!(token_id, "Token cache hit");
            return Ok(cached);
        }

        let record = self.pipeline.issuer().token(token_id).await?;
        self.token_cache.insert(token_id, record.clone()).await;
        Ok(record)
    }
}
