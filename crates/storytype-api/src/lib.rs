//! Storytype: HTTP API.
//!
//! Thin axum glue over the session, fixed-turn and game-master handlers.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod telemetry;
