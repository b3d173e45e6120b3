//! Scoring domain model.

pub mod personality;
pub mod scoring;
