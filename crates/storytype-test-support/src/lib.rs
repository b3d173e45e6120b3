//! Shared test mocks and utilities for the Storytype personality engine.

mod clock;
mod oracle;
mod repository;
mod rng;

pub use clock::FixedClock;
pub use oracle::{FailingOracle, ScriptedOracle, StallingOracle, canned_response};
pub use repository::{EmptySessionRepository, FailingSessionRepository, InMemorySessionRepository};
pub use rng::{MockRng, SequenceRng};
