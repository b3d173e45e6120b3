//! Application layer for the Session & Progress context.

pub mod command_handlers;
pub mod persistence;
pub mod query_handlers;
