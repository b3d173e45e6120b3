//! Storytype: Narrative Phase Orchestration bounded context.
//!
//! Drives fixed-turn mode: maps each question to a phase of a twelve-step
//! story arc, decides which personality axis the next question probes,
//! summarizes earlier choices for the text oracle, and falls back to a
//! static question bank whenever generation fails.

pub mod application;
pub mod domain;
