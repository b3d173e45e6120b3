//! Domain model for the Narrative Phase Orchestration context.

pub mod commands;
pub mod fallbacks;
pub mod orchestrator;
pub mod phase;
pub mod setting;
