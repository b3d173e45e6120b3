//! Storytype: Session & Progress bounded context.
//!
//! Owns the session record: find-or-create, answer submission,
//! back-navigation, completion and resumption, mode switching, and the
//! single conversion between the typed session and its stored form.

pub mod application;
pub mod domain;
