//! In-memory session registry.
//!
//! Every read-check-write happens under one coarse lock. Records are small
//! and all operations are pure in-memory work, so contention stays low.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::error::{Error, Result};
use crate::identity::Identity;
use crate::session::Session;

/// Owner of all live sessions.
pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, Session>>,
    clock: Arc<dyn Clock>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Creates a store reading the wall clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Current time as seen by this store.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Registers a new active session and returns a snapshot of it.
    pub fn create(&self, identity: Identity, task_id: impl Into<String>) -> Session {
        let session = Session::new(identity, task_id, self.clock.now());
        self.sessions.lock().insert(session.id, session.clone());
        session
    }

    /// Snapshot of a session.
    pub fn get(&self, id: Uuid) -> Result<Session> {
        self.sessions
            .lock()
            .get(&id)
            .cloned()
            .ok_or(Error::NotFound(id))
    }

    /// Appends a heartbeat and returns the new count.
    pub fn append_heartbeat(
        &self,
        id: Uuid,
        client_timestamp: Option<DateTime<Utc>>,
    ) -> Result<usize> {
        self.with_session_mut(id, |session, now| {
            session.record_heartbeat(client_timestamp, now)
        })
    }

    /// Marks a session terminal and returns the final snapshot.
    pub fn finalize(&self, id: Uuid) -> Result<Session> {
        self.with_session_mut(id, |session, now| {
            session.finalize(now)?;
            Ok(session.clone())
        })
    }

    /// Runs `f` on a session under the store lock.
    ///
    /// `f` receives the time read once for this call. Anything `f` checks
    /// and mutates is atomic with respect to every other store operation.
    pub fn with_session_mut<R>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut Session, DateTime<Utc>) -> Result<R>,
    ) -> Result<R> {
        let now = self.clock.now();
        let mut sessions = self.sessions.lock();
        let session = sessions.get_mut(&id).ok_or(Error::NotFound(id))?;
        f(session, now)
    }

    /// Removes sessions created more than `max_age` ago, ended or not.
    /// Returns how many were removed.
    pub fn sweep(&self, max_age: Duration) -> usize {
        let now = self.clock.now();
        let mut sessions = self.sessions.lock();
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(now, max_age));
        let removed = before - sessions.len();
        if removed > 0 {
            debug!(removed, remaining = sessions.len(), "Swept expired sessions");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }

    /// Number of sessions still accepting heartbeats.
    pub fn active_count(&self) -> usize {
        self.sessions
            .lock()
            .values()
            .filter(|s| !s.is_terminal())
            .count()
    }
}
