//! Attention policy configuration.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration problems detected at construction time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("missing required setting: {0}")]
    Missing(&'static str),

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("unknown provider: {0}")]
    UnknownProvider(String),
}

impl ConfigError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Timing and scoring parameters for attention sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttentionConfig {
    /// Minimum time between start and finish (ms).
    /// Development default is 10s; production deployments use 300000 (5 min).
    #[serde(default = "default_min_attention_ms")]
    pub min_attention_ms: u64,
    /// Expected client heartbeat cadence (ms)
    #[serde(default = "default_heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,
    /// Sessions scoring above this are rejected
    #[serde(default = "default_bot_score_threshold")]
    pub bot_score_threshold: f64,
    /// Sessions older than this are swept, ended or not (seconds)
    #[serde(default = "default_retention_secs")]
    pub retention_secs: u64,
    /// How often the sweeper runs (seconds)
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

/// Largest millisecond setting that fits a signed duration.
const MAX_MILLIS: u64 = i64::MAX as u64;

/// Largest second setting a `chrono::Duration` can hold.
const MAX_SECS: u64 = (i64::MAX / 1_000) as u64;

fn default_min_attention_ms() -> u64 {
    10_000
}

fn default_heartbeat_interval_ms() -> u64 {
    30_000
}

fn default_bot_score_threshold() -> f64 {
    0.7
}

fn default_retention_secs() -> u64 {
    24 * 60 * 60
}

fn default_sweep_interval_secs() -> u64 {
    60 * 60
}

impl Default for AttentionConfig {
    fn default() -> Self {
        Self {
            min_attention_ms: default_min_attention_ms(),
            heartbeat_interval_ms: default_heartbeat_interval_ms(),
            bot_score_threshold: default_bot_score_threshold(),
            retention_secs: default_retention_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl AttentionConfig {
    /// Checks that every parameter is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_attention_ms > MAX_MILLIS {
            return Err(ConfigError::invalid(
                "min_attention_ms",
                format!("must be at most {}", MAX_MILLIS),
            ));
        }
        if self.heartbeat_interval_ms > MAX_MILLIS {
            return Err(ConfigError::invalid(
                "heartbeat_interval_ms",
                format!("must be at most {}", MAX_MILLIS),
            ));
        }
        if self.heartbeat_interval_ms == 0 {
            return Err(ConfigError::invalid(
                "heartbeat_interval_ms",
                "must be greater than zero",
            ));
        }
        if !(0.0..=1.0).contains(&self.bot_score_threshold) {
            return Err(ConfigError::invalid(
                "bot_score_threshold",
                format!("{} is outside [0, 1]", self.bot_score_threshold),
            ));
        }
        if self.retention_secs == 0 {
            return Err(ConfigError::invalid(
                "retention_secs",
                "must be greater than zero",
            ));
        }
        if self.retention_secs > MAX_SECS {
            return Err(ConfigError::invalid(
                "retention_secs",
                format!("must be at most {}", MAX_SECS),
            ));
        }
        if self.sweep_interval_secs == 0 {
            return Err(ConfigError::invalid(
                "sweep_interval_secs",
                "must be greater than zero",
            ));
        }
        if self.sweep_interval_secs > MAX_SECS {
            return Err(ConfigError::invalid(
                "sweep_interval_secs",
                format!("must be at most {}", MAX_SECS),
            ));
        }
        Ok(())
    }

    /// Minimum attention time as signed milliseconds, saturating.
    pub fn min_attention(&self) -> i64 {
        i64::try_from(self.min_attention_ms).unwrap_or(i64::MAX)
    }

    /// Heartbeat cadence as signed milliseconds, saturating and never zero.
    pub fn heartbeat_interval(&self) -> i64 {
        i64::try_from(self.heartbeat_interval_ms)
            .unwrap_or(i64::MAX)
            .max(1)
    }

    /// Retention window, saturating at the largest representable duration.
    pub fn retention(&self) -> Duration {
        i64::try_from(self.retention_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX)
    }

    pub fn sweep_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.sweep_interval_secs)
    }
}
