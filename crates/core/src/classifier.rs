//! Heuristic bot-behavior classifier.
//!
//! Scores a session's heartbeat pattern in [0, 1]; higher means more
//! bot-like. Each rule adds an independent penalty and the total is capped
//! at [`MAX_BOT_SCORE`].
//!
//! Rhythm rules read the client-supplied timestamps, so a client that
//! fabricates plausible timestamps can steer its own score.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::AttentionConfig;
use crate::limits::{
    IRREGULARITY_PENALTY, IRREGULARITY_RATIO, MAX_BOT_SCORE, MIN_INTERVALS_FOR_RHYTHM,
    NO_HEARTBEAT_PENALTY, REGULARITY_PENALTY, REGULARITY_TOLERANCE_MS, SHORT_SESSION_PENALTY,
    SPARSE_PENALTY, SPARSE_RATIO,
};
use crate::session::Session;

/// Finish-time judgement of a session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub bot_score: f64,
    pub accepted: bool,
}

/// Which rules fired for a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub sparse: bool,
    pub too_regular: bool,
    pub too_irregular: bool,
    pub too_short: bool,
    pub no_heartbeats: bool,
}

impl ScoreBreakdown {
    /// Sum of fired penalties, capped.
    pub fn total(&self) -> f64 {
        let mut score = 0.0;
        if self.sparse {
            score += SPARSE_PENALTY;
        }
        if self.too_regular {
            score += REGULARITY_PENALTY;
        }
        if self.too_irregular {
            score += IRREGULARITY_PENALTY;
        }
        if self.too_short {
            score += SHORT_SESSION_PENALTY;
        }
        if self.no_heartbeats {
            score += NO_HEARTBEAT_PENALTY;
        }
        score.min(MAX_BOT_SCORE)
    }
}

/// Evaluates every rule against the session as of `now`.
pub fn breakdown(session: &Session, now: DateTime<Utc>, config: &AttentionConfig) -> ScoreBreakdown {
    let elapsed_ms = session.elapsed_ms(now).max(0);
    let count = session.heartbeat_count();
    let nominal_ms = config.heartbeat_interval();

    let expected = elapsed_ms / nominal_ms;
    let sparse = (count as f64) < expected as f64 * SPARSE_RATIO;

    let intervals = session.heartbeats.intervals_ms();
    let has_rhythm = intervals.len() > MIN_INTERVALS_FOR_RHYTHM;

    let too_regular = has_rhythm
        && intervals
            .iter()
            .all(|interval| (interval - nominal_ms).abs() < REGULARITY_TOLERANCE_MS);

    let too_irregular = has_rhythm && {
        let (mean, std_dev) = mean_and_std_dev(&intervals);
        std_dev > mean * IRREGULARITY_RATIO
    };

    ScoreBreakdown {
        sparse,
        too_regular,
        too_irregular,
        too_short: elapsed_ms < config.min_attention(),
        no_heartbeats: count == 0,
    }
}

/// Bot score for the session as of `now`.
pub fn score(session: &Session, now: DateTime<Utc>, config: &AttentionConfig) -> f64 {
    breakdown(session, now, config).total()
}

/// Score plus accept/reject against the configured threshold.
pub fn evaluate(session: &Session, now: DateTime<Utc>, config: &AttentionConfig) -> Verdict {
    let bot_score = score(session, now, config);
    Verdict {
        bot_score,
        accepted: bot_score <= config.bot_score_threshold,
    }
}

/// Mean and population standard deviation.
fn mean_and_std_dev(values: &[i64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().map(|&v| v as f64).sum::<f64>() / n;
    let variance = values
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    (mean, variance.sqrt())
}
