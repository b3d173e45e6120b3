//! Domain model for the Session & Progress context.

pub mod aggregates;
pub mod commands;
pub mod narrative_state;
pub mod story;
