//! Application layer for the Game-Master Narrative context.

pub mod command_handlers;
