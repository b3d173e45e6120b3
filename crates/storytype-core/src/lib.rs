//! Storytype Core: shared domain abstractions.
//!
//! This crate defines the fundamental traits and types that every
//! Storytype context depends on: personality axes, question/answer
//! records, the session repository seam and the text oracle seam.
//! It contains no infrastructure code.

pub mod axis;
pub mod clock;
pub mod command;
pub mod error;
pub mod oracle;
pub mod record;
pub mod repository;
pub mod rng;
