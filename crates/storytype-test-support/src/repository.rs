//! Test repositories: mock `SessionRepository` implementations for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use storytype_core::error::DomainError;
use storytype_core::repository::{SessionRepository, StoredSession};

/// A session repository backed by a map. Records every `save_session` call in
/// order, and `load_session` returns the last saved copy.
#[derive(Debug, Default)]
pub struct InMemorySessionRepository {
    sessions: Mutex<HashMap<String, StoredSession>>,
    saved: Mutex<Vec<StoredSession>>,
}

impl InMemorySessionRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository that already holds `session`. The seed does not
    /// count as a save.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn with_session(session: StoredSession) -> Self {
        let repo = Self::default();
        repo.sessions
            .lock()
            .unwrap()
            .insert(session.session_id.clone(), session);
        repo
    }

    /// Returns a snapshot of every session that was saved, oldest first.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn saved_sessions(&self) -> Vec<StoredSession> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn load_session(&self, session_id: &str) -> Result<Option<StoredSession>, DomainError> {
        Ok(self.sessions.lock().unwrap().get(session_id).cloned())
    }

    async fn save_session(&self, session: &StoredSession) -> Result<(), DomainError> {
        self.sessions
            .lock()
            .unwrap()
            .insert(session.session_id.clone(), session.clone());
        self.saved.lock().unwrap().push(session.clone());
        Ok(())
    }
}

/// A session repository that never finds anything and silently accepts
/// saves. Useful for "session not found" scenarios.
#[derive(Debug)]
pub struct EmptySessionRepository;

#[async_trait]
impl SessionRepository for EmptySessionRepository {
    async fn load_session(&self, _session_id: &str) -> Result<Option<StoredSession>, DomainError> {
        Ok(None)
    }

    async fn save_session(&self, _session: &StoredSession) -> Result<(), DomainError> {
        Ok(())
    }
}

/// A session repository that always returns an infrastructure error. Useful
/// for testing error-handling paths.
#[derive(Debug)]
pub struct FailingSessionRepository;

#[async_trait]
impl SessionRepository for FailingSessionRepository {
    async fn load_session(&self, _session_id: &str) -> Result<Option<StoredSession>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn save_session(&self, _session: &StoredSession) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}
