//! Tracing setup for structured logging.

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging configuration, part of the application config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Filter used when `RUST_LOG` is unset (e.g. "info", "attention_core=debug")
    #[serde(default = "default_filter")]
    pub filter: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_filter() -> String {
    "info,tower_http=debug".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            format: LogFormat::default(),
        }
    }
}

impl LogConfig {
    /// Reads `LOG_JSON` and `RUST_LOG` on top of the given config.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = std::env::var("LOG_JSON") {
            if v == "1" || v.eq_ignore_ascii_case("true") {
                self.format = LogFormat::Json;
            }
        }
        if let Ok(filter) = std::env::var("RUST_LOG") {
            self.filter = filter;
        }
        self
    }
}

/// Installs the global subscriber. Call once at startup.
pub fn init_tracing(config: &LogConfig) {
    let env_filter = EnvFilter::try_new(&config.filter).unwrap_or_else(|_| EnvFilter::new("info"));

    match config.format {
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .json()
                .with_target(true)
                .with_file(true)
                .with_line_number(true);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .init();
        }
        LogFormat::Text => {
            let fmt_layer = fmt::layer().with_target(true);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .init();
        }
    }

    tracing::info!(filter = %config.filter, format = ?config.format, "Tracing initialized");
}
