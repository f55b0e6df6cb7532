//! Per-session heartbeat log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A liveness signal from the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Heartbeat {
    /// Client-asserted time (server receipt time when the client sent none)
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    /// Server receipt time
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub received_at: DateTime<Utc>,
}

/// Append-only heartbeat log, kept in arrival order.
///
/// Client timestamps are untrusted and need not be monotonic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeartbeatLedger {
    entries: Vec<Heartbeat>,
}

impl HeartbeatLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a heartbeat and returns the new count.
    pub fn append(&mut self, heartbeat: Heartbeat) -> usize {
        self.entries.push(heartbeat);
        self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn as_slice(&self) -> &[Heartbeat] {
        &self.entries
    }

    /// Gaps between consecutive client timestamps, in append order (ms).
    /// May be negative when the client clock jumps backwards.
    pub fn intervals_ms(&self) -> Vec<i64> {
        self.entries
            .windows(2)
            .map(|pair| (pair[1].timestamp - pair[0].timestamp).num_milliseconds())
            .collect()
    }
}
