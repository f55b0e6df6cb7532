//! In-process metrics.
//!
//! Lock-free counters, gauges and millisecond histograms. A snapshot is
//! served on `/metrics` and logged periodically by the worker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// A monotonically increasing counter.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub const fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// A point-in-time value.
#[derive(Debug, Default)]
pub struct Gauge(AtomicU64);

impl Gauge {
    pub const fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn set(&self, val: u64) {
        self.0.store(val, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Latency accumulator (milliseconds).
#[derive(Debug)]
pub struct Histogram {
    sum: AtomicU64,
    count: AtomicU64,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    pub fn new() -> Self {
        Self {
            sum: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Records a value in milliseconds.
    pub fn observe(&self, ms: u64) {
        self.sum.fetch_add(ms, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn mean(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            0.0
        } else {
            self.sum.load(Ordering::Relaxed) as f64 / count as f64
        }
    }
}

/// Collected metrics for the attention engine.
#[derive(Debug, Default)]
pub struct Metrics {
    // Session lifecycle
    pub sessions_started: Counter,
    pub sessions_accepted: Counter,
    pub sessions_rejected_bot: Counter,
    pub finishes_too_short: Counter,
    pub heartbeats_received: Counter,
    pub heartbeats_refused: Counter,
    pub sessions_swept: Counter,

    // Issuance
    pub proofs_uploaded: Counter,
    pub proof_upload_errors: Counter,
    pub tokens_minted: Counter,
    pub mint_errors: Counter,

    // Latency
    pub finish_latency_ms: Histogram,
    pub issuance_latency_ms: Histogram,

    // Gauges
    pub sessions_live: Gauge,
    pub sessions_active: Gauge,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            sessions_started: self.sessions_started.get(),
            sessions_accepted: self.sessions_accepted.get(),
            sessions_rejected_bot: self.sessions_rejected_bot.get(),
            finishes_too_short: self.finishes_too_short.get(),
            heartbeats_received: self.heartbeats_received.get(),
            heartbeats_refused: self.heartbeats_refused.get(),
            sessions_swept: self.sessions_swept.get(),
            proofs_uploaded: self.proofs_uploaded.get(),
            proof_upload_errors: self.proof_upload_errors.get(),
            tokens_minted: self.tokens_minted.get(),
            mint_errors: self.mint_errors.get(),
            finish_latency_mean_ms: self.finish_latency_ms.mean(),
            issuance_latency_mean_ms: self.issuance_latency_ms.mean(),
            sessions_live: self.sessions_live.get(),
            sessions_active: self.sessions_active.get(),
        }
    }
}

/// A snapshot of metrics at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub sessions_started: u64,
    pub sessions_accepted: u64,
    pub sessions_rejected_bot: u64,
    pub finishes_too_short: u64,
    pub heartbeats_received: u64,
    pub heartbeats_refused: u64,
    pub sessions_swept: u64,
    pub proofs_uploaded: u64,
    pub proof_upload_errors: u64,
    pub tokens_minted: u64,
    pub mint_errors: u64,
    pub finish_latency_mean_ms: f64,
    pub issuance_latency_mean_ms: f64,
    pub sessions_live: u64,
    pub sessions_active: u64,
}

/// Global metrics registry.
pub static METRICS: std::sync::LazyLock<Metrics> = std::sync::LazyLock::new(Metrics::new);

/// Get the global metrics instance.
pub fn metrics() -> &'static Metrics {
    &METRICS
}
