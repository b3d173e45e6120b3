//! Storytype: PostgreSQL session persistence.
//!
//! Implements [`storytype_core::repository::SessionRepository`] with one row
//! per session and JSONB columns for the nested documents. The schema lives
//! in the workspace `migrations/` directory.

pub mod pg_session_repository;
