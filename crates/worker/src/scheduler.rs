//! Worker scheduler for background tasks.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, warn};

use attention_core::{AttentionConfig, SessionStore};
use issuance::{health::check_collaborators, ProofPipeline};
use telemetry::metrics::metrics;

use crate::sweeper::SessionSweeper;

/// Worker scheduler configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Sweep interval
    pub sweep_interval: Duration,
    /// Sessions older than this are removed
    pub retention: chrono::Duration,
    /// Metrics log interval
    pub metrics_log_interval: Duration,
    /// Collaborator health probe interval
    pub health_check_interval: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self::from_attention(&AttentionConfig::default())
    }
}

impl WorkerConfig {
    /// Sweep timing from the attention policy, fixed cadence for the rest.
    pub fn from_attention(config: &AttentionConfig) -> Self {
        Self {
            sweep_interval: config.sweep_interval(),
            retention: config.retention(),
            metrics_log_interval: Duration::from_secs(60),
            health_check_interval: Duration::from_secs(30),
        }
    }
}

/// Background worker scheduler.
pub struct WorkerScheduler {
    config: WorkerConfig,
    store: Arc<SessionStore>,
    pipeline: Option<ProofPipeline>,
}

/// Running workers. Dropping the handle also signals them to exit;
/// [`WorkerHandle::stop`] additionally waits until they have.
pub struct WorkerHandle {
    shutdown: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerHandle {
    /// Signals every worker and waits for it to exit.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        for handle in self.handles {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    error!("Worker task panicked: {}", e);
                }
            }
        }
        info!("Background workers stopped");
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl WorkerScheduler {
    pub fn new(config: WorkerConfig, store: Arc<SessionStore>) -> Self {
        Self {
            config,
            store,
            pipeline: None,
        }
    }

    /// Also re-probes the issuance collaborators on an interval.
    pub fn with_pipeline(
        config: WorkerConfig,
        store: Arc<SessionStore>,
        pipeline: ProofPipeline,
    ) -> Self {
        Self {
            config,
            store,
            pipeline: Some(pipeline),
        }
    }

    /// Starts all background workers.
    pub fn start(self: Arc<Self>) -> WorkerHandle {
        let (shutdown, rx) = watch::channel(false);
        let mut handles = Vec::new();

        // Sweeper
        let scheduler = self.clone();
        let stop = rx.clone();
        handles.push(tokio::spawn(async move {
            scheduler.run_sweeper(stop).await;
        }));

        // Metrics logger
        let scheduler = self.clone();
        let stop = rx.clone();
        handles.push(tokio::spawn(async move {
            scheduler.run_metrics_logger(stop).await;
        }));

        // Collaborator health
        if self.pipeline.is_some() {
            let scheduler = self.clone();
            let stop = rx;
            handles.push(tokio::spawn(async move {
                scheduler.run_health_probe(stop).await;
            }));
        }

        info!(
            workers = handles.len(),
            sweep_interval_secs = self.config.sweep_interval.as_secs(),
            retention_secs = self.config.retention.num_seconds(),
            "Background workers started"
        );
        WorkerHandle { shutdown, handles }
    }

    async fn run_sweeper(&self, mut stop: watch::Receiver<bool>) {
        let sweeper = SessionSweeper::new(self.store.clone(), self.config.retention);
        let mut ticker = interval(self.config.sweep_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    sweeper.run();
                }
                _ = stop.changed() => break,
            }
        }
    }

    async fn run_metrics_logger(&self, mut stop: watch::Receiver<bool>) {
        let mut ticker = interval(self.config.metrics_log_interval);
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let m = metrics();
                    m.sessions_live.set(self.store.len() as u64);
                    m.sessions_active.set(self.store.active_count() as u64);

                    let snapshot = m.snapshot();
                    info!(
                        sessions_started = snapshot.sessions_started,
                        sessions_accepted = snapshot.sessions_accepted,
                        sessions_rejected_bot = snapshot.sessions_rejected_bot,
                        sessions_live = snapshot.sessions_live,
                        sessions_active = snapshot.sessions_active,
                        heartbeats_received = snapshot.heartbeats_received,
                        tokens_minted = snapshot.tokens_minted,
                        mint_errors = snapshot.mint_errors,
                        "Metrics snapshot"
                    );
                }
                _ = stop.changed() => break,
            }
        }
    }

    async fn run_health_probe(&self, mut stop: watch::Receiver<bool>) {
        let Some(pipeline) = self.pipeline.as_ref() else {
            return;
        };
        let mut ticker = interval(self.config.health_check_interval);
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if !check_collaborators(pipeline).await {
                        warn!("Issuance collaborators unhealthy");
                    }
                }
                _ = stop.changed() => break,
            }
        }
    }
}
