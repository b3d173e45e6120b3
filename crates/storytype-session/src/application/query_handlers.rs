//! Query handlers for the Session & Progress context.
//!
//! Read-only views over stored sessions.

use chrono::{DateTime, Utc};
use serde::Serialize;
use storytype_core::error::DomainError;
use storytype_core::record::{AnswerRecord, QuestionRecord};
use storytype_core::repository::SessionRepository;
use storytype_scoring::domain::personality::{AxisScore, PoleScores, TypeCode};
use storytype_scoring::domain::scoring;

use crate::application::command_handlers::load_existing;
use crate::domain::aggregates::Session;
use crate::domain::narrative_state::{Ending, Scene};
use crate::domain::story::{CustomStoryConfig, ModeKind, StoryMode};

/// Game-master portion of a session view.
#[derive(Debug, Serialize)]
pub struct NarrativeView {
    /// Completion scalar, 0–100.
    pub progress: u8,
    /// The story's goal.
    pub goal: Option<String>,
    /// Items collected so far.
    pub inventory: Vec<String>,
    /// Scene awaiting a choice.
    pub current_scene: Option<Scene>,
    /// Cached ending.
    pub ending: Option<Ending>,
}

/// Read-only view of a session.
#[derive(Debug, Serialize)]
pub struct SessionView {
    /// The session identifier.
    pub session_id: String,
    /// Active mode.
    pub mode: ModeKind,
    /// Story setting.
    pub story_mode: Option<StoryMode>,
    /// Index of the next question.
    pub current_index: usize,
    /// 1-based number of the next question.
    pub question_number: usize,
    /// Answered (non-skipped) questions.
    pub answered_count: usize,
    /// Whether the run is complete.
    pub completed: bool,
    /// Whether enough answers exist to finish early.
    pub can_terminate_early: bool,
    /// Question pending at the current index.
    pub current_question: Option<QuestionRecord>,
    /// Game-master state, in game-master mode.
    pub narrative: Option<NarrativeView>,
    /// Creator-mode configuration.
    pub custom_story: Option<CustomStoryConfig>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<&Session> for SessionView {
    fn from(session: &Session) -> Self {
        Self {
            session_id: session.id.clone(),
            mode: session.mode.kind(),
            story_mode: session.story_mode,
            current_index: session.current_index(),
            question_number: session.current_question_number(),
            answered_count: session.answered_count(),
            completed: session.completed,
            can_terminate_early: session.can_terminate_early(),
            current_question: session.current_question().cloned(),
            narrative: session.narrative_state().map(|state| NarrativeView {
                progress: state.progress,
                goal: state.goal.clone(),
                inventory: state.inventory.clone(),
                current_scene: state.current_scene.clone(),
                ending: state.ending.clone(),
            }),
            custom_story: session.custom_story.clone(),
            created_at: session.created_at,
            updated_at: session.updated_at,
        }
    }
}

/// Scored personality result of a completed session.
#[derive(Debug, Serialize)]
pub struct PersonalityResultView {
    /// The session identifier.
    pub session_id: String,
    /// Four-letter code.
    pub code: TypeCode,
    /// Short title for the code.
    pub title: &'static str,
    /// One-line description of the code.
    pub description: &'static str,
    /// Per-pole vote counts.
    pub scores: PoleScores,
    /// Per-axis breakdown.
    pub axes: Vec<AxisScore>,
    /// The scored answers.
    pub answers: Vec<Option<AnswerRecord>>,
}

/// Retrieves a session by id.
///
/// # Errors
///
/// Returns `DomainError::SessionNotFound` if no session exists for the id.
pub async fn get_session_by_id(
    session_id: &str,
    repo: &dyn SessionRepository,
) -> Result<SessionView, DomainError> {
    let session = load_existing(session_id, repo).await?;
    Ok(SessionView::from(&session))
}

/// Scores a completed session.
///
/// # Errors
///
/// Returns `DomainError::SessionNotFound` if the session does not exist and
/// `DomainError::Validation` if it has not been completed.
pub async fn get_personality_result(
    session_id: &str,
    repo: &dyn SessionRepository,
) -> Result<PersonalityResultView, DomainError> {
    let session = load_existing(session_id, repo).await?;
    if !session.completed {
        return Err(DomainError::Validation(format!(
            "session {session_id} is not completed"
        )));
    }

    let result = scoring::calculate(session.answers());
    Ok(PersonalityResultView {
        session_id: session.id.clone(),
        code: result.code,
        title: result.code.title(),
        description: result.code.description(),
        axes: result.axis_scores(),
        scores: result.scores,
        answers: result.answers,
    })
}
