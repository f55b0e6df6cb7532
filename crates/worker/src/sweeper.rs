//! Session retention sweeper.
//!
//! Sessions are swept by age from `started_at`, whether or not they ended.

use attention_core::SessionStore;
use std::sync::Arc;
use telemetry::metrics::metrics;
use tracing::{debug, info};

/// Removes sessions older than the retention window.
pub struct SessionSweeper {
    store: Arc<SessionStore>,
    retention: chrono::Duration,
}

impl SessionSweeper {
    pub fn new(store: Arc<SessionStore>, retention: chrono::Duration) -> Self {
        Self { store, retention }
    }

    /// One sweep pass. Returns how many sessions were removed.
    pub fn run(&self) -> usize {
        let removed = self.store.sweep(self.retention);

        let m = metrics();
        m.sessions_swept.inc_by(removed as u64);
        m.sessions_live.set(self.store.len() as u64);
        m.sessions_active.set(self.store.active_count() as u64);

        if removed > 0 {
            info!(
                removed,
                remaining = self.store.len(),
                retention_secs = self.retention.num_seconds(),
                "Swept expired sessions"
            );
        } else {
            debug!("Sweep found nothing to remove");
        }
        removed
    }
}
