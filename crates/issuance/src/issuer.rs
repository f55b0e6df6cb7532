//! Attestation token issuance through a signing relay.
//!
//! The relay holds the contract owner key and exposes a small JSON API.
//! This service never touches key material.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::{IssuerConfig, IssuerProvider};
use crate::error::{IssuanceError, Result};
use attention_core::ConfigError;

/// Confirmed mint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintReceipt {
    pub token_id: u64,
    pub transaction_hash: String,
    pub block_number: u64,
}

/// Attestation data stored with a token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    pub token_id: u64,
    pub user_address: String,
    pub task_id: String,
    /// Unix seconds at mint time
    pub timestamp: i64,
    pub ipfs_hash: String,
}

/// Whether a user already holds a token for a task.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenOwnership {
    pub exists: bool,
    pub token_id: Option<u64>,
}

/// Mint cooldown state for a user.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintEligibility {
    pub can_mint: bool,
    /// Seconds until the next mint is allowed
    pub time_remaining: u64,
}

/// Mint request body sent to the relay.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MintRequest<'a> {
    to: &'a str,
    task_id: &'a str,
    ipfs_hash: &'a str,
}

/// Mints and looks up attestation tokens.
#[async_trait]
pub trait TokenIssuer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Mints a token for `user_address` referencing the proof at `ipfs_hash`.
    async fn mint(&self, user_address: &str, task_id: &str, ipfs_hash: &str)
        -> Result<MintReceipt>;

    /// Returns `TokenNotFound` for unknown ids.
    async fn token(&self, token_id: u64) -> Result<TokenRecord>;

    async fn ownership(&self, user_address: &str, task_id: &str) -> Result<TokenOwnership>;

    async fn eligibility(&self, user_address: &str) -> Result<MintEligibility>;

    async fn health_check(&self) -> bool;
}

/// Issuer client for the HTTP signing relay.
pub struct RelayIssuer {
    base_url: String,
    api_token: Option<String>,
    http_client: reqwest::Client,
}

impl RelayIssuer {
    pub fn new(
        base_url: impl Into<String>,
        api_token: Option<String>,
        timeout: Duration,
    ) -> std::result::Result<Self, ConfigError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::invalid("issuer.timeout_secs", e.to_string()))?;

        Ok(Self {
            base_url: base_url.into(),
            api_token,
            http_client,
        })
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "Calling issuer relay");

        let response = self
            .authorize(self.http_client.get(&url))
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Issuer relay request failed");
                IssuanceError::Lookup(format!("Issuer relay unavailable: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(IssuanceError::Lookup(format!(
                "Issuer relay returned {}: {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| IssuanceError::Lookup(format!("Invalid relay response: {}", e)))
    }
}

#[async_trait]
impl TokenIssuer for RelayIssuer {
    fn name(&self) -> &'static str {
        "relay"
    }

    async fn mint(
        &self,
        user_address: &str,
        task_id: &str,
        ipfs_hash: &str,
    ) -> Result<MintReceipt> {
        let url = format!("{}/mint", self.base_url);
        let request = MintRequest {
            to: user_address,
            task_id,
            ipfs_hash,
        };

        let response = self
            .authorize(self.http_client.post(&url))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Mint request failed");
                IssuanceError::Mint(format!("Issuer relay unavailable: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Issuer relay rejected mint");
            return Err(IssuanceError::Mint(format!(
                "Issuer relay returned {}: {}",
                status, body
            )));
        }

        let receipt: MintReceipt = response
            .json()
            .await
            .map_err(|e| IssuanceError::Mint(format!("Invalid mint receipt: {}", e)))?;

        info!(
            token_id = receipt.token_id,
            tx = %receipt.transaction_hash,
            block = receipt.block_number,
            "Token minted"
        );
        Ok(receipt)
    }

    async fn token(&self, token_id: u64) -> Result<TokenRecord> {
        let url = format!("{}/tokens/{}", self.base_url, token_id);
        let response = self
            .authorize(self.http_client.get(&url))
            .send()
            .await
            .map_err(|e| IssuanceError::Lookup(format!("Issuer relay unavailable: {}", e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(IssuanceError::TokenNotFound(token_id));
        }
        if !response.status().is_success() {
            return Err(IssuanceError::Lookup(format!(
                "Issuer relay returned {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| IssuanceError::Lookup(format!("Invalid token record: {}", e)))
    }

    async fn ownership(&self, user_address: &str, task_id: &str) -> Result<TokenOwnership> {
        let path = format!(
            "/owners/{}/tasks/{}",
            user_address,
            url::form_urlencoded::byte_serialize(task_id.as_bytes()).collect::<String>()
        );
        self.get_json(&path).await
    }

    async fn eligibility(&self, user_address: &str) -> Result<MintEligibility> {
        self.get_json(&format!("/owners/{}/eligibility", user_address))
            .await
    }

    async fn health_check(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        match self.authorize(self.http_client.get(&url)).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!(error = %e, "Issuer relay health check failed");
                false
            }
        }
    }
}

/// Builds a relay issuer from config. `Mock` is handled by the caller.
pub fn build_relay_issuer(config: &IssuerConfig) -> std::result::Result<RelayIssuer, ConfigError> {
    match config.provider()? {
        IssuerProvider::Relay {
            base_url,
            api_token,
        } => RelayIssuer::new(base_url, api_token, config.timeout()),
        IssuerProvider::Mock => Err(ConfigError::invalid(
            "issuer.provider",
            "mock provider has no relay client",
        )),
    }
}
