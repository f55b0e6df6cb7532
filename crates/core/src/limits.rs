//! Input limits and classifier constants.
//!
//! Penalty weights and cut-offs of the bot classifier live here so the
//! scoring code reads as a list of rules.

// === Request Limits ===

/// Account address format: `0x` followed by 40 hex characters.
pub const ACCOUNT_ADDRESS_PATTERN: &str = r"^0x[a-fA-F0-9]{40}$";

/// Task identifier max length (chars).
pub const MAX_TASK_ID_LEN: usize = 256;

/// Hard cap on heartbeats kept per session.
///
/// At the nominal 30s cadence this is more than the 24h retention window
/// can produce, so honest clients never reach it.
pub const MAX_HEARTBEATS_PER_SESSION: usize = 10_000;

// === Classifier Rules ===

/// Sparse rule fires when count < expected × this ratio.
pub const SPARSE_RATIO: f64 = 0.5;

/// Penalty for too few heartbeats.
pub const SPARSE_PENALTY: f64 = 0.3;

/// Regularity/irregularity rules need strictly more intervals than this.
pub const MIN_INTERVALS_FOR_RHYTHM: usize = 3;

/// An interval closer than this to the nominal cadence counts as "exact" (ms).
pub const REGULARITY_TOLERANCE_MS: i64 = 1_000;

/// Penalty for perfectly periodic heartbeats.
pub const REGULARITY_PENALTY: f64 = 0.4;

/// Irregularity rule fires when std-dev > mean × this ratio.
pub const IRREGULARITY_RATIO: f64 = 0.5;

/// Penalty for erratic heartbeats.
pub const IRREGULARITY_PENALTY: f64 = 0.2;

/// Penalty for a session shorter than the minimum attention time.
pub const SHORT_SESSION_PENALTY: f64 = 0.3;

/// Penalty for a session with no heartbeats at all.
pub const NO_HEARTBEAT_PENALTY: f64 = 0.5;

/// Scores are capped here.
pub const MAX_BOT_SCORE: f64 = 1.0;
