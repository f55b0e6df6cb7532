//! Attention session types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::classifier::Verdict;
use crate::error::{Error, Result};
use crate::identity::Identity;
use crate::ledger::{Heartbeat, HeartbeatLedger};
use crate::limits::MAX_HEARTBEATS_PER_SESSION;

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// Accepting heartbeats
    Active,
    /// Finished and judged human
    Accepted,
    /// Finished and judged bot-like
    Rejected,
    /// Finished without a verdict
    Ended,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Active)
    }
}

/// A bounded attention-tracking interaction between one identity and one task.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Unique session ID
    pub id: Uuid,
    /// Owning identity (lowercase)
    pub identity: Identity,
    /// Opaque task identifier
    pub task_id: String,
    /// Session start time
    pub started_at: DateTime<Utc>,
    /// Heartbeats in arrival order
    pub heartbeats: HeartbeatLedger,
    /// Set once, by finalize
    pub ended: bool,
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_ms: Option<i64>,
    /// Recorded by the lifecycle manager at finish
    pub verdict: Option<Verdict>,
}

impl Session {
    /// Creates a new active session starting at `now`.
    pub fn new(identity: Identity, task_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            identity,
            task_id: task_id.into(),
            started_at: now,
            heartbeats: HeartbeatLedger::new(),
            ended: false,
            ended_at: None,
            duration_ms: None,
            verdict: None,
        }
    }

    pub fn state(&self) -> SessionState {
        match (self.ended, self.verdict) {
            (false, _) => SessionState::Active,
            (true, Some(v)) if v.accepted => SessionState::Accepted,
            (true, Some(_)) => SessionState::Rejected,
            (true, None) => SessionState::Ended,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.ended
    }

    pub fn heartbeat_count(&self) -> usize {
        self.heartbeats.len()
    }

    /// Milliseconds since start as of `now`.
    pub fn elapsed_ms(&self, now: DateTime<Utc>) -> i64 {
        (now - self.started_at).num_milliseconds()
    }

    /// Whether the session was created more than `max_age` before `now`.
    pub fn is_expired(&self, now: DateTime<Utc>, max_age: chrono::Duration) -> bool {
        now - self.started_at > max_age
    }

    /// Appends a heartbeat; the client timestamp falls back to `now`.
    pub fn record_heartbeat(
        &mut self,
        client_timestamp: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<usize> {
        if self.ended {
            return Err(Error::InvalidState(self.id));
        }
        if self.heartbeats.len() >= MAX_HEARTBEATS_PER_SESSION {
            return Err(Error::validation(format!(
                "session already holds the maximum of {} heartbeats",
                MAX_HEARTBEATS_PER_SESSION
            )));
        }
        Ok(self.heartbeats.append(Heartbeat {
            timestamp: client_timestamp.unwrap_or(now),
            received_at: now,
        }))
    }

    /// Marks the session terminal at `now` and returns its duration (ms).
    pub fn finalize(&mut self, now: DateTime<Utc>) -> Result<i64> {
        if self.ended {
            return Err(Error::InvalidState(self.id));
        }
        let duration_ms = self.elapsed_ms(now);
        self.ended = true;
        self.ended_at = Some(now);
        self.duration_ms = Some(duration_ms);
        Ok(duration_ms)
    }

    /// Records the finish verdict. Only valid once, after finalize.
    pub fn record_verdict(&mut self, verdict: Verdict) -> Result<()> {
        if !self.ended || self.verdict.is_some() {
            return Err(Error::InvalidState(self.id));
        }
        self.verdict = Some(verdict);
        Ok(())
    }
}
