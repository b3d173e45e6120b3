//! Application layer for the Narrative Phase Orchestration context.

pub mod command_handlers;
