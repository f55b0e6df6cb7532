//! Shared harness for HTTP-level tests.
//!
//! Every test drives the real router with a manual clock and in-memory
//! collaborators, so timing rules are exercised without sleeping.

pub mod fixtures;
pub mod mocks;
pub mod setup;
