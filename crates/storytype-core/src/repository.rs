//! Session repository abstraction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::DomainError;

/// Stored representation of a session.
///
/// Nested structures are kept as JSON documents; the session context owns the
/// single conversion between this shape and its typed `Session`.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSession {
    /// Opaque session identifier.
    pub session_id: String,
    /// Interaction mode (`fixed-turn` or `game-master`).
    pub mode: String,
    /// Story setting, once chosen.
    pub story_mode: Option<String>,
    /// Generated questions, in order.
    pub questions: serde_json::Value,
    /// Sparse answer list; `null` marks a skipped slot.
    pub answers: serde_json::Value,
    /// Index of the next question to answer. Signed so storage can hold bad data.
    pub current_index: i64,
    /// Whether the assessment has been completed.
    pub completed: bool,
    /// Game-master state document (empty object in fixed-turn mode).
    pub narrative_state: serde_json::Value,
    /// Creator-mode story configuration (empty object when absent).
    pub custom_story_config: serde_json::Value,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Repository trait for loading and saving sessions.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Load a session by identifier. Returns `Ok(None)` when absent.
    async fn load_session(&self, session_id: &str) -> Result<Option<StoredSession>, DomainError>;

    /// Insert or replace a session. The last completed write wins.
    async fn save_session(&self, session: &StoredSession) -> Result<(), DomainError>;
}
