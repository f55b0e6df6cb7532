//! Proof artifact storage on IPFS.

use async_trait::async_trait;
use attention_core::ProofRecord;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::{IpfsConfig, IpfsProvider};
use crate::error::{IssuanceError, Result};
use attention_core::ConfigError;

/// Publishes proof documents and reads them back.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Stores the proof document and returns its content id.
    async fn upload_proof(&self, proof: &ProofRecord) -> Result<String>;

    /// Reads a previously stored proof document.
    async fn fetch_proof(&self, cid: &str) -> Result<serde_json::Value>;

    /// Whether the backend is reachable with the configured credentials.
    async fn health_check(&self) -> bool;
}

/// Pinata `pinFileToIPFS` response.
#[derive(Debug, Deserialize)]
struct PinataPinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

/// IPFS HTTP API `add` response.
#[derive(Debug, Deserialize)]
struct AddResponse {
    #[serde(rename = "Hash")]
    hash: String,
}

/// Artifact store backed by a pinning service or an IPFS node.
pub struct IpfsArtifactStore {
    provider: IpfsProvider,
    gateway: String,
    http_client: reqwest::Client,
}

impl IpfsArtifactStore {
    /// Builds the store; fails on any missing credential or bad URL.
    pub fn new(config: &IpfsConfig) -> std::result::Result<Self, ConfigError> {
        let provider = config.provider()?;
        if provider == IpfsProvider::Mock {
            return Err(ConfigError::invalid(
                "ipfs.provider",
                "mock provider has no IPFS client",
            ));
        }

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ConfigError::invalid("ipfs.timeout_secs", e.to_string()))?;

        info!(provider = %config.provider, "Created IPFS artifact store");

        Ok(Self {
            provider,
            gateway: config.gateway_prefix()?,
            http_client,
        })
    }

    fn file_part(proof: &ProofRecord) -> Result<Part> {
        let body = proof.to_json_pretty()?;
        let file_name = format!("poa-proof-{}.json", proof.ended_at.timestamp_millis());
        Part::bytes(body)
            .file_name(file_name)
            .mime_str("application/json")
            .map_err(|e| IssuanceError::Upload(e.to_string()))
    }

    async fn pin_with_pinata(
        &self,
        base_url: &str,
        api_key: &str,
        secret_key: &str,
        proof: &ProofRecord,
    ) -> Result<String> {
        let metadata = serde_json::json!({ "name": format!("POA Proof - {}", proof.task_id) });
        let form = Form::new()
            .part("file", Self::file_part(proof)?)
            .text("pinataMetadata", metadata.to_string());

        let response = self
            .http_client
            .post(format!("{}/pinning/pinFileToIPFS", base_url))
            .header("pinata_api_key", api_key)
            .header("pinata_secret_api_key", secret_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| IssuanceError::Upload(format!("Pinata unavailable: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(IssuanceError::Upload(format!(
                "Pinata returned {}: {}",
                status, body
            )));
        }

        let pinned: PinataPinResponse = response
            .json()
            .await
            .map_err(|e| IssuanceError::Upload(format!("Invalid Pinata response: {}", e)))?;
        Ok(pinned.ipfs_hash)
    }

    async fn add_to_node(
        &self,
        base_url: &str,
        basic_auth: Option<(&str, &str)>,
        proof: &ProofRecord,
    ) -> Result<String> {
        let form = Form::new().part("file", Self::file_part(proof)?);

        let mut request = self
            .http_client
            .post(format!("{}/api/v0/add", base_url))
            .query(&[("pin", "true")])
            .multipart(form);
        if let Some((user, pass)) = basic_auth {
            request = request.basic_auth(user, Some(pass));
        }

        let response = request
            .send()
            .await
            .map_err(|e| IssuanceError::Upload(format!("IPFS node unavailable: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(IssuanceError::Upload(format!(
                "IPFS node returned {}: {}",
                status, body
            )));
        }

        let added: AddResponse = response
            .json()
            .await
            .map_err(|e| IssuanceError::Upload(format!("Invalid IPFS response: {}", e)))?;
        Ok(added.hash)
    }
}

#[async_trait]
impl ArtifactStore for IpfsArtifactStore {
    fn name(&self) -> &'static str {
        match self.provider {
            IpfsProvider::Pinata { .. } => "pinata",
            IpfsProvider::Infura { .. } => "infura",
            IpfsProvider::Local { .. } => "local",
            IpfsProvider::Mock => "mock",
        }
    }

    async fn upload_proof(&self, proof: &ProofRecord) -> Result<String> {
        debug!(
            provider = self.name(),
            session_id = %proof.session_id,
            "Uploading proof to IPFS"
        );

        let cid = match &self.provider {
            IpfsProvider::Pinata {
                base_url,
                api_key,
                secret_key,
            } => {
                self.pin_with_pinata(base_url, api_key, secret_key, proof)
                    .await?
            }
            IpfsProvider::Infura {
                base_url,
                project_id,
                project_secret,
            } => {
                let auth = Some((project_id.as_str(), project_secret.as_str()));
                self.add_to_node(base_url, auth, proof).await?
            }
            IpfsProvider::Local { base_url } => self.add_to_node(base_url, None, proof).await?,
            IpfsProvider::Mock => {
                return Err(IssuanceError::Upload("mock provider has no IPFS client".into()))
            }
        };

        info!(provider = self.name(), cid = %cid, "Uploaded proof to IPFS");
        Ok(cid)
    }

    async fn fetch_proof(&self, cid: &str) -> Result<serde_json::Value> {
        let url = format!("{}{}", self.gateway, cid);
        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| IssuanceError::Fetch(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(IssuanceError::ProofNotFound(cid.to_string()));
        }
        if !response.status().is_success() {
            return Err(IssuanceError::Fetch(format!(
                "gateway returned {} for {}",
                response.status(),
                cid
            )));
        }

        response
            .json()
            .await
            .map_err(|e| IssuanceError::Fetch(format!("Invalid proof document: {}", e)))
    }

    async fn health_check(&self) -> bool {
        let request = match &self.provider {
            IpfsProvider::Pinata {
                base_url,
                api_key,
                secret_key,
            } => self
                .http_client
                .get(format!("{}/data/testAuthentication", base_url))
                .header("pinata_api_key", api_key.as_str())
                .header("pinata_secret_api_key", secret_key.as_str()),
            IpfsProvider::Infura {
                base_url,
                project_id,
                project_secret,
            } => self
                .http_client
                .post(format!("{}/api/v0/version", base_url))
                .basic_auth(project_id, Some(project_secret)),
            IpfsProvider::Local { base_url } => self
                .http_client
                .post(format!("{}/api/v0/version", base_url)),
            IpfsProvider::Mock => return false,
        };

        match request.send().await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                warn!(provider = self.name(), status = %response.status(), "IPFS health check failed");
                false
            }
            Err(e) => {
                warn!(provider = self.name(), error = %e, "IPFS health check failed");
                false
            }
        }
    }
}
