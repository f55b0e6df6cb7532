//! Core types and rules for the Proof-of-Attention engine.
//!
//! Sessions, the heartbeat ledger, the session store, the bot classifier
//! and the lifecycle manager that ties them together.

pub mod classifier;
pub mod clock;
pub mod config;
pub mod error;
pub mod identity;
pub mod ledger;
pub mod lifecycle;
pub mod limits;
pub mod proof;
pub mod session;
pub mod store;

pub use classifier::{ScoreBreakdown, Verdict};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AttentionConfig, ConfigError};
pub use error::{Error, Result, SessionErrorCode};
pub use identity::Identity;
pub use ledger::{Heartbeat, HeartbeatLedger};
pub use lifecycle::{FinishReport, HeartbeatAck, LifecycleManager, StartedSession};
pub use proof::ProofRecord;
pub use session::{Session, SessionState};
pub use store::SessionStore;
