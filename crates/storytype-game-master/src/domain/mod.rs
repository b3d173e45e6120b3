//! Domain model for the Game-Master Narrative context.

pub mod commands;
pub mod engine;
pub mod fallbacks;
pub mod goals;
pub mod prompts;
