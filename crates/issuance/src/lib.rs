//! Proof issuance for accepted attention sessions.
//!
//! Two capabilities, each behind a trait so deployments and tests can swap
//! implementations:
//! - [`ArtifactStore`]: publishes the proof document (IPFS)
//! - [`TokenIssuer`]: mints the attestation token (signing relay)
//!
//! [`ProofPipeline`] runs them in order for one proof.

pub mod artifact;
pub mod config;
pub mod error;
pub mod health;
pub mod issuer;
pub mod mock;
pub mod pipeline;

pub use artifact::*;
pub use config::*;
pub use error::{IssuanceError, Result};
pub use issuer::*;
pub use mock::{MockArtifactStore, MockIssuer};
pub use pipeline::*;
