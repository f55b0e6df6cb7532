//! Probes the issuance collaborators and records the result.

use telemetry::health::health;
use tracing::debug;

use crate::pipeline::ProofPipeline;

/// Runs both health checks and updates the global registry.
/// Returns whether both collaborators are healthy.
pub async fn check_collaborators(pipeline: &ProofPipeline) -> bool {
    let (artifacts_ok, issuer_ok) = tokio::join!(
        pipeline.artifacts().health_check(),
        pipeline.issuer().health_check()
    );

    let registry = health();
    registry.artifact_store.record(
        artifacts_ok,
        &format!("{} artifact store unreachable", pipeline.artifacts().name()),
    );
    registry.issuer.record(
        issuer_ok,
        &format!("{} issuer unreachable", pipeline.issuer().name()),
    );

    debug!(artifacts_ok, issuer_ok, "Collaborator health checked");
    artifacts_ok && issuer_ok
}
