//! Storytype: Game-Master Narrative bounded context.
//!
//! Drives game-master mode: an open-ended story whose scenes each probe one
//! personality axis, moving a 0–100 progress scalar toward a generated
//! ending. Axis usage is balanced by capping every axis at five scenes
//! until all four are exhausted.

pub mod application;
pub mod domain;
