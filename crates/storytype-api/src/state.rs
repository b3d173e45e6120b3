//! Shared application state.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use storytype_core::clock::Clock;
use storytype_core::oracle::TextOracle;
use storytype_core::repository::SessionRepository;
use storytype_core::rng::DeterministicRng;
use storytype_narrative::domain::orchestrator::PhaseOrchestrator;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Clock for deterministic timestamps.
    pub clock: Arc<dyn Clock + Send + Sync>,
    /// RNG for goal and dimension selection.
    pub rng: Arc<Mutex<dyn DeterministicRng + Send>>,
    /// Session persistence.
    pub session_repository: Arc<dyn SessionRepository>,
    /// Text generation backend.
    pub oracle: Arc<dyn TextOracle>,
    /// Upper bound on any single oracle call.
    pub oracle_timeout: Duration,
    /// Fixed-turn question scheduling.
    pub orchestrator: PhaseOrchestrator,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock + Send + Sync>,
        rng: Arc<Mutex<dyn DeterministicRng + Send>>,
        session_repository: Arc<dyn SessionRepository>,
        oracle: Arc<dyn TextOracle>,
        oracle_timeout: Duration,
        orchestrator: PhaseOrchestrator,
    ) -> Self {
        Self {
            clock,
            rng,
            session_repository,
            oracle,
            oracle_timeout,
            orchestrator,
        }
    }
}
