//! Proof record handed to issuance after a session is accepted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::ledger::HeartbeatLedger;
use crate::session::Session;

/// Everything issuance needs to publish and mint a proof.
///
/// This is also the JSON document pinned as the proof artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofRecord {
    pub session_id: Uuid,
    pub user_address: String,
    pub task_id: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub started_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub ended_at: DateTime<Utc>,
    /// Milliseconds
    pub duration: i64,
    pub heartbeat_count: usize,
    pub heartbeats: HeartbeatLedger,
    pub bot_score: f64,
}

impl ProofRecord {
    /// Builds the record from a finalized, scored session.
    pub fn from_session(session: &Session) -> Result<Self> {
        let (Some(ended_at), Some(duration), Some(verdict)) =
            (session.ended_at, session.duration_ms, session.verdict)
        else {
            return Err(Error::internal(format!(
                "session {} has not been finalized and scored",
                session.id
            )));
        };

        Ok(Self {
            session_id: session.id,
            user_address: session.identity.to_string(),
            task_id: session.task_id.clone(),
            started_at: session.started_at,
            ended_at,
            duration,
            heartbeat_count: session.heartbeat_count(),
            heartbeats: session.heartbeats.clone(),
            bot_score: verdict.bot_score,
        })
    }

    /// Pretty JSON body for the artifact store.
    pub fn to_json_pretty(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}
