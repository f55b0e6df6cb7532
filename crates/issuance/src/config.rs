//! Issuance configuration.
//!
//! Everything is validated when the collaborators are built. A missing key
//! is a startup error, never a half-configured client.

use attention_core::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Artifact store and issuer settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssuanceConfig {
    #[serde(default)]
    pub ipfs: IpfsConfig,
    #[serde(default)]
    pub issuer: IssuerConfig,
}

/// IPFS pinning settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpfsConfig {
    /// pinata, infura, local, or mock
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Pinata API key
    pub api_key: Option<String>,
    /// Pinata secret key
    pub secret_key: Option<String>,
    /// Infura project id
    pub project_id: Option<String>,
    /// Infura project secret
    pub project_secret: Option<String>,
    /// Local node API URL
    #[serde(default = "default_local_url")]
    pub url: String,
    #[serde(default = "default_pinata_url")]
    pub pinata_url: String,
    #[serde(default = "default_infura_url")]
    pub infura_url: String,
    /// Gateway prefix used to read artifacts back
    #[serde(default = "default_gateway")]
    pub gateway: String,
    #[serde(default = "default_ipfs_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_provider() -> String {
    "mock".to_string()
}

fn default_local_url() -> String {
    "http://localhost:5001".to_string()
}

fn default_pinata_url() -> String {
    "https://api.pinata.cloud".to_string()
}

fn default_infura_url() -> String {
    "https://ipfs.infura.io:5001".to_string()
}

fn default_gateway() -> String {
    "https://ipfs.io/ipfs/".to_string()
}

fn default_ipfs_timeout_secs() -> u64 {
    30
}

impl Default for IpfsConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_key: None,
            secret_key: None,
            project_id: None,
            project_secret: None,
            url: default_local_url(),
            pinata_url: default_pinata_url(),
            infura_url: default_infura_url(),
            gateway: default_gateway(),
            timeout_secs: default_ipfs_timeout_secs(),
        }
    }
}

/// Where proofs get pinned, with the credentials that provider needs.
#[derive(Debug, Clone, PartialEq)]
pub enum IpfsProvider {
    Pinata {
        base_url: String,
        api_key: String,
        secret_key: String,
    },
    Infura {
        base_url: String,
        project_id: String,
        project_secret: String,
    },
    Local {
        base_url: String,
    },
    Mock,
}

impl IpfsConfig {
    /// Resolves the provider and checks its credentials.
    pub fn provider(&self) -> Result<IpfsProvider, ConfigError> {
        match self.provider.trim().to_lowercase().as_str() {
            "pinata" => Ok(IpfsProvider::Pinata {
                base_url: parse_base_url("ipfs.pinata_url", &self.pinata_url)?,
                api_key: required("ipfs.api_key", &self.api_key)?,
                secret_key: required("ipfs.secret_key", &self.secret_key)?,
            }),
            "infura" => Ok(IpfsProvider::Infura {
                base_url: parse_base_url("ipfs.infura_url", &self.infura_url)?,
                project_id: required("ipfs.project_id", &self.project_id)?,
                project_secret: required("ipfs.project_secret", &self.project_secret)?,
            }),
            "local" => Ok(IpfsProvider::Local {
                base_url: parse_base_url("ipfs.url", &self.url)?,
            }),
            "mock" => Ok(IpfsProvider::Mock),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }

    /// Gateway prefix, always ending in `/`.
    pub fn gateway_prefix(&self) -> Result<String, ConfigError> {
        Url::parse(&self.gateway).map_err(|e| ConfigError::invalid("ipfs.gateway", e.to_string()))?;
        if self.gateway.ends_with('/') {
            Ok(self.gateway.clone())
        } else {
            Ok(format!("{}/", self.gateway))
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Token issuer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuerConfig {
    /// relay or mock
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Base URL of the minting relay
    pub relay_url: Option<String>,
    /// Bearer token for the relay
    pub api_token: Option<String>,
    /// Minting waits for confirmation, so this is generous
    #[serde(default = "default_issuer_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_issuer_timeout_secs() -> u64 {
    120
}

impl Default for IssuerConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            relay_url: None,
            api_token: None,
            timeout_secs: default_issuer_timeout_secs(),
        }
    }
}

/// Resolved issuer backend.
#[derive(Debug, Clone, PartialEq)]
pub enum IssuerProvider {
    Relay {
        base_url: String,
        api_token: Option<String>,
    },
    Mock,
}

impl IssuerConfig {
    pub fn provider(&self) -> Result<IssuerProvider, ConfigError> {
        match self.provider.trim().to_lowercase().as_str() {
            "relay" => {
                let url = required("issuer.relay_url", &self.relay_url)?;
                Ok(IssuerProvider::Relay {
                    base_url: parse_base_url("issuer.relay_url", &url)?,
                    api_token: self.api_token.clone().filter(|t| !t.trim().is_empty()),
                })
            }
            "mock" => Ok(IssuerProvider::Mock),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn required(field: &'static str, value: &Option<String>) -> Result<String, ConfigError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(ConfigError::Missing(field))
}

/// Validates an http(s) URL and strips the trailing slash.
fn parse_base_url(field: &'static str, raw: &str) -> Result<String, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::invalid(field, e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::invalid(
            field,
            format!("unsupported scheme {}", url.scheme()),
        ));
    }
    Ok(raw.trim_end_matches('/').to_string())
}
