//! Command handlers for the Session & Progress context.
//!
//! Each handler loads the session, applies the command through the
//! aggregate, and persists the result through the repository.

use storytype_core::clock::Clock;
use storytype_core::command::Command;
use storytype_core::error::DomainError;
use storytype_core::record::AnswerRecord;
use storytype_core::repository::{SessionRepository, StoredSession};
use tracing::info;

use crate::application::persistence::{reconstitute, to_stored_session};
use crate::domain::aggregates::{MIN_ANSWERS_TO_COMPLETE, Session};
use crate::domain::commands::{
    ChooseStoryMode, CompleteSession, ConfigureCustomStory, FindOrCreateSession, ResumeSession,
    StepBack, SubmitAnswer, SwitchMode,
};

fn log_command(command: &dyn Command) {
    info!(
        command_type = command.command_type(),
        correlation_id = %command.correlation_id(),
        session_id = command.session_id(),
        "handling command"
    );
}

/// Loads a session, returning `None` when it does not exist.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a blank id and propagates
/// repository failures.
pub async fn load_session(
    session_id: &str,
    repo: &dyn SessionRepository,
) -> Result<Option<Session>, DomainError> {
    DomainError::ensure_session_id(session_id)?;
    repo.load_session(session_id)
        .await?
        .map(reconstitute)
        .transpose()
}

/// Loads a session that must already exist.
///
/// # Errors
///
/// Returns `DomainError::SessionNotFound` when absent.
pub async fn load_existing(
    session_id: &str,
    repo: &dyn SessionRepository,
) -> Result<Session, DomainError> {
    load_session(session_id, repo)
        .await?
        .ok_or_else(|| DomainError::SessionNotFound(session_id.to_owned()))
}

/// Returns the stored session, or creates and persists a fresh one.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a blank id and propagates
/// repository failures.
pub async fn find_or_create(
    session_id: &str,
    clock: &dyn Clock,
    repo: &dyn SessionRepository,
) -> Result<Session, DomainError> {
    if let Some(session) = load_session(session_id, repo).await? {
        return Ok(session);
    }
    let session = Session::new(session_id, clock.now());
    save(&session, repo).await?;
    info!(session_id = %session.id, "created session");
    Ok(session)
}

/// Validates and writes a stored session.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the id is blank or the index is
/// negative.
pub async fn save_stored(
    stored: &StoredSession,
    repo: &dyn SessionRepository,
) -> Result<(), DomainError> {
    DomainError::ensure_session_id(&stored.session_id)?;
    if stored.current_index < 0 {
        return Err(DomainError::Validation(format!(
            "current index must not be negative, got {}",
            stored.current_index
        )));
    }
    repo.save_session(stored).await
}

/// Persists `session`.
///
/// # Errors
///
/// Returns `DomainError::Validation` for an invalid session and propagates
/// repository failures.
pub async fn save(session: &Session, repo: &dyn SessionRepository) -> Result<(), DomainError> {
    save_stored(&to_stored_session(session)?, repo).await
}

/// Writes `answer` at `index`, pads skipped slots, and persists.
///
/// # Errors
///
/// Propagates validation and repository failures.
pub async fn append_answer(
    session: &mut Session,
    index: usize,
    answer: AnswerRecord,
    clock: &dyn Clock,
    repo: &dyn SessionRepository,
) -> Result<(), DomainError> {
    session.append_answer(index, answer, clock.now());
    save(session, repo).await
}

/// Steps back one question and persists. Answers are kept.
///
/// # Errors
///
/// Propagates validation and repository failures.
pub async fn rewind(
    session: &mut Session,
    clock: &dyn Clock,
    repo: &dyn SessionRepository,
) -> Result<(), DomainError> {
    session.rewind(clock.now());
    save(session, repo).await
}

/// Handles `FindOrCreateSession`.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a blank id.
pub async fn handle_find_or_create(
    command: &FindOrCreateSession,
    clock: &dyn Clock,
    repo: &dyn SessionRepository,
) -> Result<Session, DomainError> {
    log_command(command);
    find_or_create(&command.session_id, clock, repo).await
}

/// Handles `SubmitAnswer`: records the chosen side of the question pending at
/// the current index.
///
/// # Errors
///
/// Returns `DomainError::Validation` when no question is pending.
pub async fn handle_submit_answer(
    command: &SubmitAnswer,
    clock: &dyn Clock,
    repo: &dyn SessionRepository,
) -> Result<Session, DomainError> {
    log_command(command);
    let mut session = load_existing(&command.session_id, repo).await?;
    let index = session.current_index();
    let Some(question) = session.current_question() else {
        return Err(DomainError::Validation(format!(
            "no question is pending at index {index}"
        )));
    };
    let answer = AnswerRecord::from_question(question, command.choice);
    append_answer(&mut session, index, answer, clock, repo).await?;
    Ok(session)
}

/// Handles `StepBack`.
///
/// # Errors
///
/// Returns `DomainError::SessionNotFound` when the session does not exist.
pub async fn handle_step_back(
    command: &StepBack,
    clock: &dyn Clock,
    repo: &dyn SessionRepository,
) -> Result<Session, DomainError> {
    log_command(command);
    let mut session = load_existing(&command.session_id, repo).await?;
    rewind(&mut session, clock, repo).await?;
    Ok(session)
}

/// Handles `CompleteSession`.
///
/// # Errors
///
/// Returns `DomainError::Validation` when fewer than three questions were
/// answered.
pub async fn handle_complete(
    command: &CompleteSession,
    clock: &dyn Clock,
    repo: &dyn SessionRepository,
) -> Result<Session, DomainError> {
    log_command(command);
    let mut session = load_existing(&command.session_id, repo).await?;
    if !session.can_terminate_early() {
        return Err(DomainError::Validation(format!(
            "at least {MIN_ANSWERS_TO_COMPLETE} answers are needed to finish, got {}",
            session.answered_count()
        )));
    }
    session.complete(clock.now());
    save(&session, repo).await?;
    Ok(session)
}

/// Handles `ResumeSession`.
///
/// # Errors
///
/// Returns `DomainError::SessionNotFound` when the session does not exist.
pub async fn handle_resume(
    command: &ResumeSession,
    clock: &dyn Clock,
    repo: &dyn SessionRepository,
) -> Result<Session, DomainError> {
    log_command(command);
    let mut session = load_existing(&command.session_id, repo).await?;
    session.resume(clock.now());
    save(&session, repo).await?;
    Ok(session)
}

/// Handles `SwitchMode`. Narrative state always starts over.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a blank id.
pub async fn handle_switch_mode(
    command: &SwitchMode,
    clock: &dyn Clock,
    repo: &dyn SessionRepository,
) -> Result<Session, DomainError> {
    log_command(command);
    let mut session = find_or_create(&command.session_id, clock, repo).await?;
    session.switch_mode(command.mode, clock.now());
    save(&session, repo).await?;
    Ok(session)
}

/// Handles `ChooseStoryMode`.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a blank id.
pub async fn handle_choose_story_mode(
    command: &ChooseStoryMode,
    clock: &dyn Clock,
    repo: &dyn SessionRepository,
) -> Result<Session, DomainError> {
    log_command(command);
    let mut session = find_or_create(&command.session_id, clock, repo).await?;
    session.choose_story_mode(command.story_mode, clock.now());
    save(&session, repo).await?;
    Ok(session)
}

/// Handles `ConfigureCustomStory`: switches to creator mode and restarts.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a blank id.
pub async fn handle_configure_custom_story(
    command: &ConfigureCustomStory,
    clock: &dyn Clock,
    repo: &dyn SessionRepository,
) -> Result<Session, DomainError> {
    log_command(command);
    let mut session = find_or_create(&command.session_id, clock, repo).await?;
    session.configure_custom_story(command.config.clone().compact(), clock.now());
    save(&session, repo).await?;
    Ok(session)
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};
    use serde_json::json;
    use storytype_core::axis::Axis;
    use storytype_core::record::{QuestionRecord, Side};
    use uuid::Uuid;

    use super::*;
    use crate::domain::story::{CustomStoryConfig, ModeKind, StoryMode};
    use storytype_test_support::{
        FailingSessionRepository, FixedClock, InMemorySessionRepository,
    };

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
    }

    fn question(dimension: Axis) -> QuestionRecord {
        QuestionRecord {
            question: format!("{dimension} question"),
            option_a: "first".to_owned(),
            option_b: "second".to_owned(),
            dimension,
        }
    }

    async fn seeded(repo: &InMemorySessionRepository, answers: usize) -> Session {
        let clock = FixedClock(fixed_now());
        let mut session = find_or_create("abc", &clock, repo).await.unwrap();
        for index in 0..answers {
            let answer = AnswerRecord::from_question(&question(Axis::ALL[index % 4]), Side::A);
            append_answer(&mut session, index, answer, &clock, repo)
                .await
                .unwrap();
        }
        session
    }

    #[tokio::test]
    async fn test_find_or_create_persists_new_session_once() {
        // Arrange
        let clock = FixedClock(fixed_now());
        let repo = InMemorySessionRepository::new();
        let command = FindOrCreateSession {
            correlation_id: Uuid::new_v4(),
            session_id: "abc".to_owned(),
        };

        // Act
        let first = handle_find_or_create(&command, &clock, &repo).await.unwrap();
        let second = handle_find_or_create(&command, &clock, &repo).await.unwrap();

        // Assert
        assert_eq!(first, second);
        assert_eq!(repo.saved_sessions().len(), 1);
        let stored = &repo.saved_sessions()[0];
        assert_eq!(stored.session_id, "abc");
        assert_eq!(stored.current_index, 0);
        assert_eq!(stored.created_at, fixed_now());
    }

    #[tokio::test]
    async fn test_find_or_create_rejects_blank_id() {
        let clock = FixedClock(fixed_now());
        let repo = InMemorySessionRepository::new();

        let result = find_or_create("   ", &clock, &repo).await;

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert!(repo.saved_sessions().is_empty());
    }

    #[tokio::test]
    async fn test_save_stored_rejects_negative_index() {
        let repo = InMemorySessionRepository::new();
        let session = Session::new("abc", fixed_now());
        let mut stored = to_stored_session(&session).unwrap();
        stored.current_index = -1;

        let result = save_stored(&stored, &repo).await;

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert!(repo.saved_sessions().is_empty());
    }

    #[tokio::test]
    async fn test_append_answer_persists_sparse_list() {
        // Arrange
        let clock = FixedClock(fixed_now());
        let repo = InMemorySessionRepository::new();
        let mut session = seeded(&repo, 2).await;

        // Act
        let answer = AnswerRecord::from_question(&question(Axis::TF), Side::B);
        append_answer(&mut session, 5, answer, &clock, &repo)
            .await
            .unwrap();

        // Assert
        let stored = repo.saved_sessions().pop().unwrap();
        let answers = stored.answers.as_array().unwrap();
        assert_eq!(answers.len(), 6);
        assert!(answers[2..5].iter().all(serde_json::Value::is_null));
        assert_eq!(answers[5]["choice"], "B");
        assert_eq!(stored.current_index, 6);
    }

    #[tokio::test]
    async fn test_submit_answer_denormalizes_pending_question() {
        // Arrange
        let clock = FixedClock(fixed_now());
        let repo = InMemorySessionRepository::new();
        let mut session = seeded(&repo, 0).await;
        session.record_question(question(Axis::JP), fixed_now());
        save(&session, &repo).await.unwrap();
        let command = SubmitAnswer {
            correlation_id: Uuid::new_v4(),
            session_id: "abc".to_owned(),
            choice: Side::B,
        };

        // Act
        let session = handle_submit_answer(&command, &clock, &repo).await.unwrap();

        // Assert
        assert_eq!(session.current_index(), 1);
        let answer = session.answers()[0].as_ref().unwrap();
        assert_eq!(answer.dimension, "JP");
        assert_eq!(answer.chosen_text(), "second");
    }

    #[tokio::test]
    async fn test_submit_answer_without_pending_question_is_rejected() {
        let clock = FixedClock(fixed_now());
        let repo = InMemorySessionRepository::new();
        seeded(&repo, 0).await;
        let command = SubmitAnswer {
            correlation_id: Uuid::new_v4(),
            session_id: "abc".to_owned(),
            choice: Side::A,
        };

        let result = handle_submit_answer(&command, &clock, &repo).await;

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn test_step_back_keeps_answers() {
        let clock = FixedClock(fixed_now());
        let repo = InMemorySessionRepository::new();
        seeded(&repo, 2).await;
        let command = StepBack {
            correlation_id: Uuid::new_v4(),
            session_id: "abc".to_owned(),
        };

        let session = handle_step_back(&command, &clock, &repo).await.unwrap();

        assert_eq!(session.current_index(), 1);
        assert_eq!(session.answered_count(), 2);
    }

    #[tokio::test]
    async fn test_step_back_on_missing_session_is_not_found() {
        let clock = FixedClock(fixed_now());
        let repo = InMemorySessionRepository::new();
        let command = StepBack {
            correlation_id: Uuid::new_v4(),
            session_id: "ghost".to_owned(),
        };

        let result = handle_step_back(&command, &clock, &repo).await;

        match result.unwrap_err() {
            DomainError::SessionNotFound(id) => assert_eq!(id, "ghost"),
            other => panic!("expected SessionNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_complete_requires_three_answers() {
        // Arrange
        let clock = FixedClock(fixed_now());
        let repo = InMemorySessionRepository::new();
        seeded(&repo, 2).await;
        let command = CompleteSession {
            correlation_id: Uuid::new_v4(),
            session_id: "abc".to_owned(),
        };

        // Act
        let early = handle_complete(&command, &clock, &repo).await;
        let mut session = load_existing("abc", &repo).await.unwrap();
        let answer = AnswerRecord::from_question(&question(Axis::SN), Side::A);
        append_answer(&mut session, 2, answer, &clock, &repo)
            .await
            .unwrap();
        let completed = handle_complete(&command, &clock, &repo).await.unwrap();

        // Assert
        assert!(matches!(early, Err(DomainError::Validation(_))));
        assert!(completed.completed);
    }

    #[tokio::test]
    async fn test_resume_clears_completed_flag() {
        let clock = FixedClock(fixed_now());
        let repo = InMemorySessionRepository::new();
        let mut session = seeded(&repo, 3).await;
        session.complete(fixed_now());
        save(&session, &repo).await.unwrap();
        let command = ResumeSession {
            correlation_id: Uuid::new_v4(),
            session_id: "abc".to_owned(),
        };

        let session = handle_resume(&command, &clock, &repo).await.unwrap();

        assert!(!session.completed);
        assert!(!repo.saved_sessions().pop().unwrap().completed);
    }

    #[tokio::test]
    async fn test_switch_mode_stores_fresh_narrative_state() {
        let clock = FixedClock(fixed_now());
        let repo = InMemorySessionRepository::new();
        let command = SwitchMode {
            correlation_id: Uuid::new_v4(),
            session_id: "abc".to_owned(),
            mode: ModeKind::GameMaster,
        };

        handle_switch_mode(&command, &clock, &repo).await.unwrap();

        let stored = repo.saved_sessions().pop().unwrap();
        assert_eq!(stored.mode, "game-master");
        assert_eq!(stored.narrative_state["progress"], 0);
    }

    #[tokio::test]
    async fn test_choose_story_mode_is_persisted() {
        let clock = FixedClock(fixed_now());
        let repo = InMemorySessionRepository::new();
        let command = ChooseStoryMode {
            correlation_id: Uuid::new_v4(),
            session_id: "abc".to_owned(),
            story_mode: StoryMode::Horror,
        };

        handle_choose_story_mode(&command, &clock, &repo).await.unwrap();

        let stored = repo.saved_sessions().pop().unwrap();
        assert_eq!(stored.story_mode.as_deref(), Some("horror"));
    }

    #[tokio::test]
    async fn test_configure_custom_story_resets_run() {
        // Arrange
        let clock = FixedClock(fixed_now());
        let repo = InMemorySessionRepository::new();
        seeded(&repo, 4).await;
        let command = ConfigureCustomStory {
            correlation_id: Uuid::new_v4(),
            session_id: "abc".to_owned(),
            config: CustomStoryConfig {
                setting: Some("Orbital station".to_owned()),
                mood: Some(String::new()),
                ..CustomStoryConfig::default()
            },
        };

        // Act
        let session = handle_configure_custom_story(&command, &clock, &repo)
            .await
            .unwrap();

        // Assert
        assert!(session.answers().is_empty());
        assert_eq!(session.current_index(), 0);
        let stored = repo.saved_sessions().pop().unwrap();
        assert_eq!(stored.story_mode.as_deref(), Some("creator"));
        assert_eq!(stored.custom_story_config, json!({ "setting": "Orbital station" }));
    }

    #[tokio::test]
    async fn test_repository_failure_is_propagated() {
        let clock = FixedClock(fixed_now());
        let repo = FailingSessionRepository;

        let result = find_or_create("abc", &clock, &repo).await;

        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
    }
}
