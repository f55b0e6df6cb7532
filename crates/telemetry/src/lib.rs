//! Telemetry for the attention engine.
//!
//! Structured logging via `tracing`, atomic in-process metrics exposed on
//! `/metrics`, and a health registry for the issuance collaborators.

pub mod health;
pub mod metrics;
pub mod tracing_setup;

pub use health::*;
pub use metrics::*;
pub use tracing_setup::*;
