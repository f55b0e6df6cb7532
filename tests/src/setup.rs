//! Common test setup functions.

use api::{router, state::AppState};
use attention_core::{AttentionConfig, LifecycleManager, ManualClock, SessionStore};
use axum::Router;
use axum_test::TestServer;
use issuance::{ArtifactStore, MockArtifactStore, MockIssuer, ProofPipeline, TokenIssuer};
use std::sync::Arc;

/// Test context over the real router.
///
/// - Sessions live in a store driven by a `ManualClock`
/// - Issuance uses in-memory collaborators unless a test swaps one out
/// - Minimum attention time is the 10 second default
pub struct TestContext {
    pub clock: Arc<ManualClock>,
    pub store: Arc<SessionStore>,
    pub artifacts: Arc<MockArtifactStore>,
    pub issuer: Arc<MockIssuer>,
    pub pipeline: ProofPipeline,
    pub router: Router,
}

impl TestContext {
    pub fn new() -> Self {
        let artifacts = Arc::new(MockArtifactStore::new());
        Self::build(artifacts.clone(), artifacts)
    }

    /// Same wiring with a different artifact store.
    pub fn with_artifact_store(store: Arc<dyn ArtifactStore>) -> Self {
        Self::build(Arc::new(MockArtifactStore::new()), store)
    }

    fn build(artifacts: Arc<MockArtifactStore>, active: Arc<dyn ArtifactStore>) -> Self {
        let clock = Arc::new(ManualClock::starting_now());
        let store = Arc::new(SessionStore::with_clock(clock.clone()));
        let lifecycle = Arc::new(LifecycleManager::new(
            store.clone(),
            AttentionConfig::default(),
        ));

        let issuer = Arc::new(MockIssuer::new());
        let pipeline = ProofPipeline::new(active, issuer.clone() as Arc<dyn TokenIssuer>);
        let router = router(AppState::new(lifecycle, pipeline.clone()));

        Self {
            clock,
            store,
            artifacts,
            issuer,
            pipeline,
            router,
        }
    }

    pub fn server(&self) -> TestServer {
        TestServer::new(self.router.clone()).expect("Failed to create test server")
    }

    /// Moves the session clock forward.
    pub fn advance_secs(&self, secs: i64) {
        self.clock.advance(chrono::Duration::seconds(secs));
    }

    /// Make the issuer fail every mint (for error testing).
    pub fn set_issuer_failure(&self, should_fail: bool) {
        self.issuer.set_should_fail(should_fail);
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
