//! Session lifecycle: start, heartbeat, finish.
//!
//! ```text
//! Active ──finish (duration ok)──▶ Accepted | Rejected
//!   │  ▲
//!   └──┘ heartbeat / finish too early
//! ```
//!
//! A finish attempted before the minimum attention time leaves the session
//! active so the caller can retry. Once the duration check passes the
//! session is committed terminal and scored exactly once.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::classifier;
use crate::config::AttentionConfig;
use crate::error::{Error, Result};
use crate::identity::Identity;
use crate::proof::ProofRecord;
use crate::store::SessionStore;

/// Result of a successful start.
#[derive(Debug, Clone)]
pub struct StartedSession {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
}

/// Result of an accepted heartbeat.
#[derive(Debug, Clone, Copy)]
pub struct HeartbeatAck {
    /// Timestamp recorded for this heartbeat
    pub timestamp: DateTime<Utc>,
    pub heartbeat_count: usize,
}

/// Result of an accepted finish.
#[derive(Debug, Clone)]
pub struct FinishReport {
    pub session_id: Uuid,
    pub duration_ms: i64,
    pub heartbeat_count: usize,
    pub bot_score: f64,
    pub accepted: bool,
    /// Handoff for proof issuance
    pub proof: ProofRecord,
}

/// Orchestrates session transitions over an injected store.
pub struct LifecycleManager {
    store: Arc<SessionStore>,
    config: AttentionConfig,
}

impl LifecycleManager {
    pub fn new(store: Arc<SessionStore>, config: AttentionConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn config(&self) -> &AttentionConfig {
        &self.config
    }

    /// Opens a new session for `identity` on `task_id`.
    pub fn start(&self, identity: &str, task_id: &str) -> StartedSession {
        let session = self.store.create(Identity::new(identity), task_id);

        info!(
            session_id = %session.id,
            user = %session.identity,
            task_id = %session.task_id,
            "Session started"
        );

        StartedSession {
            session_id: session.id,
            started_at: session.started_at,
        }
    }

    /// Records a liveness signal from the session owner.
    pub fn heartbeat(
        &self,
        session_id: Uuid,
        identity: &str,
        client_timestamp: Option<DateTime<Utc>>,
    ) -> Result<HeartbeatAck> {
        let ack = self.store.with_session_mut(session_id, |session, now| {
            if session.is_terminal() {
                return Err(Error::InvalidState(session_id));
            }
            if !session.identity.matches(identity) {
                return Err(Error::IdentityMismatch);
            }
            let heartbeat_count = session.record_heartbeat(client_timestamp, now)?;
            Ok(HeartbeatAck {
                timestamp: client_timestamp.unwrap_or(now),
                heartbeat_count,
            })
        })?;

        debug!(
            session_id = %session_id,
            heartbeat_count = ack.heartbeat_count,
            "Heartbeat received"
        );
        Ok(ack)
    }

    /// Ends the session and judges it.
    ///
    /// Checks run in order: existence, terminal state, identity, minimum
    /// duration. Only after all pass is the session committed terminal and
    /// scored; a score above the threshold yields `BotLikeRejected`.
    pub fn finish(&self, session_id: Uuid, identity: &str) -> Result<FinishReport> {
        let config = &self.config;

        let report = self.store.with_session_mut(session_id, |session, now| {
            if session.is_terminal() {
                return Err(Error::InvalidState(session_id));
            }
            if !session.identity.matches(identity) {
                return Err(Error::IdentityMismatch);
            }

            let duration_ms = session.elapsed_ms(now);
            if duration_ms < config.min_attention() {
                return Err(Error::DurationTooShort {
                    duration_ms,
                    min_duration_ms: config.min_attention_ms,
                });
            }

            session.finalize(now)?;
            let breakdown = classifier::breakdown(session, now, config);
            let verdict = classifier::evaluate(session, now, config);
            session.record_verdict(verdict)?;

            let heartbeat_count = session.heartbeat_count();
            if !verdict.accepted {
                warn!(
                    session_id = %session_id,
                    bot_score = verdict.bot_score,
                    heartbeat_count,
                    duration_ms,
                    signals = ?breakdown,
                    "Session rejected as bot-like"
                );
                return Err(Error::BotLikeRejected {
                    bot_score: verdict.bot_score,
                    duration_ms,
                    heartbeat_count,
                });
            }

            Ok(FinishReport {
                session_id,
                duration_ms,
                heartbeat_count,
                bot_score: verdict.bot_score,
                accepted: verdict.accepted,
                proof: ProofRecord::from_session(session)?,
            })
        });

        match &report {
            Ok(report) => info!(
                session_id = %session_id,
                duration_ms = report.duration_ms,
                heartbeat_count = report.heartbeat_count,
                bot_score = report.bot_score,
                "Session accepted"
            ),
            Err(Error::DurationTooShort {
                duration_ms,
                min_duration_ms,
            }) => debug!(
                session_id = %session_id,
                duration_ms,
                min_duration_ms,
                "Finish attempted too early"
            ),
            Err(_) => {}
        }

        report
    }
}
