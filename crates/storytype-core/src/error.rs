//! Domain error types.

use thiserror::Error;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No session exists for the given identifier.
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// Input rejected before any state changed (blank id, negative index, ...).
    #[error("validation error: {0}")]
    Validation(String),

    /// Stored or generated data did not have the expected shape.
    ///
    /// Engines recover from this locally; it never crosses a handler boundary.
    #[error("data format error: {0}")]
    DataFormat(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl DomainError {
    /// Returns `Validation` if `session_id` is blank.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` when the id is empty or whitespace.
    pub fn ensure_session_id(session_id: &str) -> Result<(), Self> {
        if session_id.trim().is_empty() {
            return Err(Self::Validation("session id must not be blank".to_owned()));
        }
        Ok(())
    }
}
