//! Background workers for the attention engine.
//!
//! - Sweeper (drops sessions past their retention window)
//! - Metrics logger (periodic snapshot in the logs)
//! - Health probe (re-checks the issuance collaborators)

pub mod scheduler;
pub mod sweeper;

pub use scheduler::*;
pub use sweeper::SessionSweeper;
