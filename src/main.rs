//! Proof-of-Attention Engine
//!
//! Tracks attention sessions through periodic heartbeats, scores them for
//! bot-like timing, and turns accepted sessions into on-chain proofs:
//! - Session lifecycle over an in-memory store
//! - Proof artifacts pinned to IPFS, tokens minted through a signing relay
//! - Background sweeping of expired sessions

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};

use api::{router, AppState};
use attention_core::{AttentionConfig, LifecycleManager, SessionStore};
use issuance::{health::check_collaborators, IpfsConfig, IssuanceConfig, IssuerConfig, ProofPipeline};
use telemetry::{init_tracing, LogConfig};
use worker::{WorkerConfig, WorkerScheduler};

/// Application configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct Config {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,

    #[serde(default)]
    log: LogConfig,

    #[serde(default)]
    attention: AttentionConfig,

    #[serde(default)]
    ipfs: IpfsConfig,

    #[serde(default)]
    issuer: IssuerConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log: LogConfig::default(),
            attention: AttentionConfig::default(),
            ipfs: IpfsConfig::default(),
            issuer: IssuerConfig::default(),
        }
    }
}

impl Config {
    fn issuance(&self) -> IssuanceConfig {
        IssuanceConfig {
            ipfs: self.ipfs.clone(),
            issuer: self.issuer.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = load_config()?;

    init_tracing(&config.log.clone().with_env_overrides());

    info!("Starting Proof-of-Attention Engine v{}", env!("CARGO_PKG_VERSION"));

    config
        .attention
        .validate()
        .context("Invalid attention configuration")?;

    info!(
        min_attention_ms = config.attention.min_attention_ms,
        bot_score_threshold = config.attention.bot_score_threshold,
        retention_secs = config.attention.retention_secs,
        ipfs_provider = %config.ipfs.provider,
        issuer_provider = %config.issuer.provider,
        "Loaded configuration"
    );

    let pipeline = ProofPipeline::from_config(&config.issuance())
        .context("Invalid issuance configuration")?;

    if check_collaborators(&pipeline).await {
        info!("Issuance collaborators: healthy");
    } else {
        error!("Issuance collaborators: unhealthy");
    }

    let store = Arc::new(SessionStore::new());
    let lifecycle = Arc::new(LifecycleManager::new(
        store.clone(),
        config.attention.clone(),
    ));

    // Start background workers
    let worker_scheduler = Arc::new(WorkerScheduler::with_pipeline(
        WorkerConfig::from_attention(&config.attention),
        store.clone(),
        pipeline.clone(),
    ));
    let workers = worker_scheduler.start();

    let app = router(AppState::new(lifecycle, pipeline));

    // Start HTTP server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid server address")?;

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down...");
    workers.stop().await;

    info!(sessions_dropped = store.len(), "Shutdown complete");
    Ok(())
}

/// Load configuration from files and environment.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        // Start with defaults
        .add_source(config::Config::try_from(&Config::default())?)
        // Load from config file if exists
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        // Override with environment variables
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("POA")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let mut config: Config = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    apply_legacy_env(&mut config, |key| std::env::var(key).ok())?;

    Ok(config)
}

/// Unprefixed variable names used by existing deployments.
fn apply_legacy_env(config: &mut Config, var: impl Fn(&str) -> Option<String>) -> Result<()> {
    if let Some(port) = var("PORT") {
        config.port = port.trim().parse().context("PORT must be a port number")?;
    }
    if let Some(ms) = var("MIN_ATTENTION_TIME") {
        config.attention.min_attention_ms = ms
            .trim()
            .parse()
            .context("MIN_ATTENTION_TIME must be milliseconds")?;
    }

    if let Some(provider) = var("IPFS_PROVIDER") {
        config.ipfs.provider = provider;
    }
    if let Some(key) = var("IPFS_API_KEY") {
        config.ipfs.api_key = Some(key);
    }
    if let Some(secret) = var("IPFS_SECRET_KEY") {
        config.ipfs.secret_key = Some(secret);
    }
    if let Some(id) = var("IPFS_PROJECT_ID") {
        config.ipfs.project_id = Some(id);
    }
    if let Some(secret) = var("IPFS_PROJECT_SECRET") {
        config.ipfs.project_secret = Some(secret);
    }
    if let Some(url) = var("IPFS_URL") {
        config.ipfs.url = url;
    }
    if let Some(gateway) = var("IPFS_GATEWAY") {
        config.ipfs.gateway = gateway;
    }

    if let Some(url) = var("ISSUER_RELAY_URL") {
        config.issuer.relay_url = Some(url);
        // A relay URL alone selects the relay.
        if var("POA_ISSUER__PROVIDER").is_none() {
            config.issuer.provider = "relay".to_string();
        }
    }
    if let Some(token) = var("ISSUER_API_TOKEN") {
        config.issuer.api_token = Some(token);
    }

    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
