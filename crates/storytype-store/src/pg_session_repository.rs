//! `PostgreSQL` implementation of the `SessionRepository` trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::debug;

use storytype_core::error::DomainError;
use storytype_core::repository::{SessionRepository, StoredSession};

/// PostgreSQL-backed session repository.
#[derive(Debug, Clone)]
pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    /// Creates a new `PgSessionRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    session_id: String,
    mode: String,
    story_mode: Option<String>,
    questions: Json<serde_json::Value>,
    answers: Json<serde_json::Value>,
    current_index: i64,
    completed: bool,
    narrative_state: Json<serde_json::Value>,
    custom_story_config: Json<serde_json::Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SessionRow> for StoredSession {
    fn from(row: SessionRow) -> Self {
        Self {
            session_id: row.session_id,
            mode: row.mode,
            story_mode: row.story_mode,
            questions: row.questions.0,
            answers: row.answers.0,
            current_index: row.current_index,
            completed: row.completed,
            narrative_state: row.narrative_state.0,
            custom_story_config: row.custom_story_config.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn infrastructure(context: &str, err: &sqlx::Error) -> DomainError {
    DomainError::Infrastructure(format!("{context}: {err}"))
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn load_session(&self, session_id: &str) -> Result<Option<StoredSession>, DomainError> {
        let row = sqlx::query_as::<_, SessionRow>(
            r"SELECT session_id, mode, story_mode, questions, answers, current_index,
                     completed, narrative_state, custom_story_config, created_at, updated_at
              FROM personality_sessions
              WHERE session_id = $1",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| infrastructure("failed to load session", &e))?;

        debug!(session_id, found = row.is_some(), "loaded session row");
        Ok(row.map(StoredSession::from))
    }

    async fn save_session(&self, session: &StoredSession) -> Result<(), DomainError> {
        sqlx::query(
            r"INSERT INTO personality_sessions (
                  session_id, mode, story_mode, questions, answers, current_index,
                  completed, narrative_state, custom_story_config, created_at, updated_at
              )
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
              ON CONFLICT (session_id) DO UPDATE SET
                  mode = EXCLUDED.mode,
                  story_mode = EXCLUDED.story_mode,
                  questions = EXCLUDED.questions,
                  answers = EXCLUDED.answers,
                  current_index = EXCLUDED.current_index,
                  completed = EXCLUDED.completed,
                  narrative_state = EXCLUDED.narrative_state,
                  custom_story_config = EXCLUDED.custom_story_config,
                  updated_at = EXCLUDED.updated_at",
        )
        .bind(&session.session_id)
        .bind(&session.mode)
        .bind(&session.story_mode)
        .bind(Json(&session.questions))
        .bind(Json(&session.answers))
        .bind(session.current_index)
        .bind(session.completed)
        .bind(Json(&session.narrative_state))
        .bind(Json(&session.custom_story_config))
        .bind(session.created_at)
        .bind(session.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| infrastructure("failed to save session", &e))?;

        debug!(session_id = %session.session_id, "saved session row");
        Ok(())
    }
}
