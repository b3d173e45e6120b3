//! Command handlers for the Game-Master Narrative context.
//!
//! Each handler loads the session, runs the engine against its narrative
//! state, consults the text oracle where needed, and persists once at the
//! end. Oracle failures are always absorbed by the static fallbacks.

use std::sync::Mutex;
use std::time::Duration;

use serde::Serialize;
use storytype_core::clock::Clock;
use storytype_core::command::Command;
use storytype_core::error::DomainError;
use storytype_core::oracle::{OraclePrompt, TextOracle, consult};
use storytype_core::record::{AnswerRecord, Side};
use storytype_core::repository::SessionRepository;
use storytype_core::rng::{DeterministicRng, with_locked};
use storytype_session::application::command_handlers::{find_or_create, load_existing, save};
use storytype_session::domain::aggregates::Session;
use storytype_session::domain::narrative_state::{Ending, NarrativeState, Scene};
use tracing::{debug, info, warn};

use crate::domain::commands::{GenerateEnding, GenerateScene, RecordChoice};
use crate::domain::engine::{
    available_dimensions, choice_description, ending_from_response, initialize, merge_updates,
    record_choice, scene_from_response, select_dimension,
};
use crate::domain::fallbacks::{fallback_ending, fallback_scene};
use crate::domain::prompts::{ending_prompt, scene_prompt};

/// Where returned text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextSource {
    /// Already stored on the session.
    Stored,
    /// Freshly generated by the text oracle.
    Oracle,
    /// Taken from the static fallbacks.
    Fallback,
}

/// The scene awaiting a choice, with the story's standing.
#[derive(Debug, Clone, Serialize)]
pub struct SceneOutcome {
    /// The scene.
    pub scene: Scene,
    /// Progress toward the ending, 0–100.
    pub progress: u8,
    /// The story's goal.
    pub goal: Option<String>,
    /// Items collected so far.
    pub inventory: Vec<String>,
    /// Where the scene came from.
    pub source: TextSource,
}

impl SceneOutcome {
    fn new(state: &NarrativeState, scene: Scene, source: TextSource) -> Self {
        Self {
            scene,
            progress: state.progress,
            goal: state.goal.clone(),
            inventory: state.inventory.clone(),
            source,
        }
    }
}

/// Result of answering a scene.
#[derive(Debug, Clone, Serialize)]
pub struct ChoiceOutcome {
    /// Progress after the choice.
    pub progress: u8,
    /// History line recorded for the choice.
    pub description: String,
    /// Whether the story has reached its end.
    pub finished: bool,
    /// The ending, when this choice finished the story.
    pub ending: Option<Ending>,
}

/// A story's ending.
#[derive(Debug, Clone, Serialize)]
pub struct EndingOutcome {
    /// The ending.
    pub ending: Ending,
    /// Where the ending came from.
    pub source: TextSource,
}

fn log_command(command: &dyn Command) {
    info!(
        command_type = command.command_type(),
        correlation_id = %command.correlation_id(),
        session_id = command.session_id(),
        "handling command"
    );
}

fn narrative_state_mut(session: &mut Session) -> Result<&mut NarrativeState, DomainError> {
    let id = session.id.clone();
    session.narrative_state_mut().ok_or_else(|| {
        DomainError::Validation(format!("session {id} is not in game-master mode"))
    })
}

fn ensure_open(session: &Session) -> Result<(), DomainError> {
    if session.completed {
        return Err(DomainError::Validation(format!(
            "session {} is already completed",
            session.id
        )));
    }
    Ok(())
}

async fn produce_ending(
    session_id: &str,
    prompt: &OraclePrompt,
    oracle: &dyn TextOracle,
    oracle_timeout: Duration,
) -> (Ending, TextSource) {
    debug!(session_id, prompt_chars = prompt.body.len(), "requesting ending from oracle");
    match consult(oracle, prompt, oracle_timeout)
        .await
        .and_then(|response| ending_from_response(&response))
    {
        Ok(ending) => (ending, TextSource::Oracle),
        Err(e) => {
            warn!(session_id, error = %e, "ending generation failed; using fallback ending");
            (fallback_ending(), TextSource::Fallback)
        }
    }
}

/// Handles `GenerateScene`: returns the scene awaiting a choice, or starts
/// the story if needed and generates the next scene.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a blank id, a session outside
/// game-master mode, or a finished story. Propagates repository failures.
pub async fn handle_generate_scene(
    command: &GenerateScene,
    clock: &dyn Clock,
    rng: &Mutex<dyn DeterministicRng + Send>,
    oracle: &dyn TextOracle,
    oracle_timeout: Duration,
    repo: &dyn SessionRepository,
) -> Result<SceneOutcome, DomainError> {
    log_command(command);

    let mut session = find_or_create(&command.session_id, clock, repo).await?;
    ensure_open(&session)?;
    let session_id = session.id.clone();
    let story_mode = session.story_mode;
    let custom = session.custom_story.clone();

    let state = narrative_state_mut(&mut session)?;
    if state.is_finished() || state.ending.is_some() {
        return Err(DomainError::Validation(format!(
            "the story of session {session_id} has already ended"
        )));
    }
    if let Some(scene) = state.current_scene.clone() {
        return Ok(SceneOutcome::new(state, scene, TextSource::Stored));
    }

    let (axis, prompt) = with_locked(rng, |rng| {
        if initialize(state, story_mode, custom.as_ref(), rng) {
            info!(session_id = %session_id, goal = ?state.goal, "story started");
        }
        let available = available_dimensions(&mut state.dimension_usage_counts);
        let axis = select_dimension(state, rng);
        let prompt = scene_prompt(state, story_mode, custom.as_ref(), axis, &available);
        (axis, prompt)
    })?;
    debug!(
        session_id = %session_id,
        dimension = %axis,
        prompt_chars = prompt.body.len(),
        "requesting scene from oracle"
    );

    let generated = consult(oracle, &prompt, oracle_timeout)
        .await
        .and_then(|response| {
            scene_from_response(&response, axis).map(|scene| (scene, response.auxiliary))
        });

    let state = narrative_state_mut(&mut session)?;
    let (scene, source) = match generated {
        Ok((scene, updates)) => {
            merge_updates(state, &updates);
            (scene, TextSource::Oracle)
        }
        Err(e) => {
            warn!(session_id = %session_id, dimension = %axis, error = %e, "scene generation failed; using fallback scene");
            (fallback_scene(axis), TextSource::Fallback)
        }
    };
    state.current_scene = Some(scene.clone());
    let outcome = SceneOutcome::new(state, scene, source);

    session.updated_at = clock.now();
    save(&session, repo).await?;
    info!(session_id = %session_id, dimension = %axis, source = ?source, "scene recorded");

    Ok(outcome)
}

/// Handles `RecordChoice`: applies the chosen side of the current scene,
/// records it as an answer, and generates the ending once progress reaches
/// its maximum.
///
/// # Errors
///
/// Returns `DomainError::SessionNotFound` for an unknown session and
/// `DomainError::Validation` when no scene awaits a choice or the session is
/// completed or not in game-master mode.
pub async fn handle_record_choice(
    command: &RecordChoice,
    clock: &dyn Clock,
    oracle: &dyn TextOracle,
    oracle_timeout: Duration,
    repo: &dyn SessionRepository,
) -> Result<ChoiceOutcome, DomainError> {
    log_command(command);

    let mut session = load_existing(&command.session_id, repo).await?;
    ensure_open(&session)?;
    let session_id = session.id.clone();
    let index = session.current_index();

    let state = narrative_state_mut(&mut session)?;
    let scene = state.current_scene.take().ok_or_else(|| {
        DomainError::Validation(format!("no scene is awaiting a choice in session {session_id}"))
    })?;
    let (first, second) = scene.dimension.poles();
    let (chosen, pole) = match command.choice {
        Side::A => (&scene.choice_a, first),
        Side::B => (&scene.choice_b, second),
    };
    let description = if chosen.text.trim().is_empty() {
        choice_description(pole)
    } else {
        chosen.text.clone()
    };
    if record_choice(state, chosen.progress_impact, description.clone()) {
        info!(session_id = %session_id, "story reached its end");
    }
    let progress = state.progress;
    let finished = state.is_finished();
    let pending_ending = (finished && state.ending.is_none()).then(|| ending_prompt(state));

    let answer = AnswerRecord {
        question: scene.scene_text.clone(),
        option_a: scene.choice_a.text.clone(),
        option_b: scene.choice_b.text.clone(),
        choice: command.choice,
        dimension: scene.dimension.code().to_owned(),
    };
    session.append_answer(index, answer, clock.now());

    let ending = match pending_ending {
        Some(prompt) => {
            let (ending, source) =
                produce_ending(&session_id, &prompt, oracle, oracle_timeout).await;
            narrative_state_mut(&mut session)?.ending = Some(ending.clone());
            session.complete(clock.now());
            info!(session_id = %session_id, source = ?source, "ending recorded");
            Some(ending)
        }
        None => None,
    };

    save(&session, repo).await?;
    info!(session_id = %session_id, progress, choice = %command.choice, "choice recorded");

    Ok(ChoiceOutcome {
        progress,
        description,
        finished,
        ending,
    })
}

/// Handles `GenerateEnding`: returns the cached ending, or generates,
/// caches it and completes the session.
///
/// # Errors
///
/// Returns `DomainError::SessionNotFound` for an unknown session and
/// `DomainError::Validation` for a session not in game-master mode.
pub async fn handle_generate_ending(
    command: &GenerateEnding,
    clock: &dyn Clock,
    oracle: &dyn TextOracle,
    oracle_timeout: Duration,
    repo: &dyn SessionRepository,
) -> Result<EndingOutcome, DomainError> {
    log_command(command);

    let mut session = load_existing(&command.session_id, repo).await?;
    let session_id = session.id.clone();
    let state = narrative_state_mut(&mut session)?;
    if let Some(ending) = state.ending.clone() {
        return Ok(EndingOutcome {
            ending,
            source: TextSource::Stored,
        });
    }
    let prompt = ending_prompt(state);

    let (ending, source) = produce_ending(&session_id, &prompt, oracle, oracle_timeout).await;
    narrative_state_mut(&mut session)?.ending = Some(ending.clone());
    session.complete(clock.now());
    save(&session, repo).await?;
    info!(session_id = %session_id, source = ?source, "ending recorded");

    Ok(EndingOutcome { ending, source })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use chrono::{DateTime, TimeZone, Utc};
    use storytype_core::axis::Axis;
    use storytype_core::error::DomainError;
    use storytype_core::oracle::{PromptKind, note_keys};
    use storytype_core::record::Side;
    use storytype_session::application::command_handlers::{load_existing, save};
    use storytype_session::domain::aggregates::Session;
    use storytype_session::domain::narrative_state::{NarrativeState, Scene, SceneChoice};
    use storytype_session::domain::story::ModeKind;
    use uuid::Uuid;

    use crate::application::command_handlers::{
        TextSource, handle_generate_ending, handle_generate_scene, handle_record_choice,
    };
    use crate::domain::commands::{GenerateEnding, GenerateScene, RecordChoice};
    use crate::domain::fallbacks::{fallback_ending, fallback_scene};
    use storytype_test_support::{
        FailingOracle, FixedClock, InMemorySessionRepository, MockRng, ScriptedOracle,
        canned_response,
    };

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
    }

    const TIMEOUT: Duration = Duration::from_secs(1);

    fn generate_scene() -> GenerateScene {
        GenerateScene {
            correlation_id: Uuid::new_v4(),
            session_id: "gm".to_owned(),
        }
    }

    fn record(choice: Side) -> RecordChoice {
        RecordChoice {
            correlation_id: Uuid::new_v4(),
            session_id: "gm".to_owned(),
            choice,
        }
    }

    fn generate_ending() -> GenerateEnding {
        GenerateEnding {
            correlation_id: Uuid::new_v4(),
            session_id: "gm".to_owned(),
        }
    }

    fn scene(impact_a: i32) -> Scene {
        Scene {
            scene_text: "A rope bridge sways over the gorge.".to_owned(),
            dimension: Axis::JP,
            choice_a: SceneChoice {
                text: "Map out each step".to_owned(),
                progress_impact: impact_a,
            },
            choice_b: SceneChoice {
                text: "Just start across".to_owned(),
                progress_impact: 5,
            },
        }
    }

    async fn seed(repo: &InMemorySessionRepository, state: NarrativeState) {
        let mut session = Session::new("gm", fixed_now());
        session.switch_mode(ModeKind::GameMaster, fixed_now());
        if let Some(slot) = session.narrative_state_mut() {
            *slot = state;
        }
        save(&session, repo).await.unwrap();
    }

    #[tokio::test]
    async fn test_generate_scene_starts_story_and_merges_updates() {
        // Arrange
        let clock = FixedClock(fixed_now());
        let rng = Mutex::new(MockRng);
        let repo = InMemorySessionRepository::new();
        seed(&repo, NarrativeState::default()).await;
        let mut response = canned_response("Torches flicker.", "Call out", "Hide", Some("TF"));
        response.auxiliary.inventory.push("torch".to_owned());
        response
            .auxiliary
            .flags
            .insert("entered_ruins".to_owned(), serde_json::json!(true));
        response
            .auxiliary
            .notes
            .insert(note_keys::IMPACT_B.to_owned(), "10".to_owned());
        let oracle = ScriptedOracle::replying(response);

        // Act
        let outcome =
            handle_generate_scene(&generate_scene(), &clock, &rng, &oracle, TIMEOUT, &repo)
                .await
                .unwrap();

        // Assert
        assert_eq!(outcome.source, TextSource::Oracle);
        assert_eq!(outcome.scene.dimension, Axis::EI);
        assert_eq!(outcome.scene.choice_b.progress_impact, 10);
        assert_eq!(outcome.goal.as_deref(), Some("Find the lost treasure"));
        assert_eq!(outcome.inventory, vec!["torch"]);
        assert_eq!(oracle.prompts()[0].kind, PromptKind::Scene);
        let session = load_existing("gm", &repo).await.unwrap();
        let state = session.narrative_state().unwrap();
        assert_eq!(state.dimension_usage_counts.get(Axis::EI), 1);
        assert_eq!(state.flags["entered_ruins"], serde_json::json!(true));
        assert_eq!(state.current_scene.as_ref(), Some(&outcome.scene));
    }

    #[tokio::test]
    async fn test_pending_scene_is_reused_without_counting_again() {
        let clock = FixedClock(fixed_now());
        let rng = Mutex::new(MockRng);
        let repo = InMemorySessionRepository::new();
        seed(&repo, NarrativeState::default()).await;
        let oracle = ScriptedOracle::replying(canned_response("Rain.", "Run", "Shelter", None));

        let first = handle_generate_scene(&generate_scene(), &clock, &rng, &oracle, TIMEOUT, &repo)
            .await
            .unwrap();
        let second =
            handle_generate_scene(&generate_scene(), &clock, &rng, &oracle, TIMEOUT, &repo)
                .await
                .unwrap();

        assert_eq!(second.source, TextSource::Stored);
        assert_eq!(second.scene, first.scene);
        assert_eq!(oracle.call_count(), 1);
        let session = load_existing("gm", &repo).await.unwrap();
        let usage = session.narrative_state().unwrap().dimension_usage_counts;
        assert_eq!(usage.get(Axis::EI), 1);
    }

    #[tokio::test]
    async fn test_oracle_failure_uses_fallback_scene() {
        let clock = FixedClock(fixed_now());
        let rng = Mutex::new(MockRng);
        let repo = InMemorySessionRepository::new();
        seed(&repo, NarrativeState::default()).await;

        let outcome =
            handle_generate_scene(&generate_scene(), &clock, &rng, &FailingOracle, TIMEOUT, &repo)
                .await
                .unwrap();

        assert_eq!(outcome.source, TextSource::Fallback);
        assert_eq!(outcome.scene, fallback_scene(Axis::EI));
        assert!(outcome.inventory.is_empty());
    }

    #[tokio::test]
    async fn test_generate_scene_rejects_fixed_turn_session() {
        let clock = FixedClock(fixed_now());
        let rng = Mutex::new(MockRng);
        let repo = InMemorySessionRepository::new();

        let result =
            handle_generate_scene(&generate_scene(), &clock, &rng, &FailingOracle, TIMEOUT, &repo)
                .await;

        match result.unwrap_err() {
            DomainError::Validation(message) => assert!(message.contains("game-master")),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_record_choice_applies_impact_and_records_answer() {
        // Arrange
        let clock = FixedClock(fixed_now());
        let repo = InMemorySessionRepository::new();
        seed(
            &repo,
            NarrativeState {
                progress: 20,
                goal: Some("Explore the ancient ruins".to_owned()),
                current_scene: Some(scene(5)),
                ..NarrativeState::default()
            },
        )
        .await;
        let oracle = ScriptedOracle::new(vec![]);

        // Act
        let outcome = handle_record_choice(&record(Side::B), &clock, &oracle, TIMEOUT, &repo)
            .await
            .unwrap();

        // Assert
        assert_eq!(outcome.progress, 25);
        assert!(!outcome.finished);
        assert!(outcome.ending.is_none());
        assert_eq!(outcome.description, "Just start across");
        assert_eq!(oracle.call_count(), 0);
        let session = load_existing("gm", &repo).await.unwrap();
        let answer = session.last_answer().unwrap();
        assert_eq!(answer.choice, Side::B);
        assert_eq!(answer.dimension, "JP");
        assert_eq!(session.current_index(), 1);
        let state = session.narrative_state().unwrap();
        assert!(state.current_scene.is_none());
        assert_eq!(state.history, vec!["Just start across"]);
    }

    #[tokio::test]
    async fn test_record_choice_without_scene_is_rejected() {
        let clock = FixedClock(fixed_now());
        let repo = InMemorySessionRepository::new();
        seed(&repo, NarrativeState::default()).await;

        let result =
            handle_record_choice(&record(Side::A), &clock, &FailingOracle, TIMEOUT, &repo).await;

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn test_record_choice_for_unknown_session_is_not_found() {
        let clock = FixedClock(fixed_now());
        let repo = InMemorySessionRepository::new();

        let result =
            handle_record_choice(&record(Side::A), &clock, &FailingOracle, TIMEOUT, &repo).await;

        match result.unwrap_err() {
            DomainError::SessionNotFound(id) => assert_eq!(id, "gm"),
            other => panic!("expected SessionNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_saturating_choice_generates_ending_exactly_once() {
        // Arrange
        let clock = FixedClock(fixed_now());
        let repo = InMemorySessionRepository::new();
        seed(
            &repo,
            NarrativeState {
                progress: 60,
                goal: Some("Find the lost treasure".to_owned()),
                current_scene: Some(scene(150)),
                ..NarrativeState::default()
            },
        )
        .await;
        let oracle = ScriptedOracle::replying(canned_response(
            "The treasure glitters in the dawn light.",
            "",
            "",
            None,
        ));

        // Act
        let outcome = handle_record_choice(&record(Side::A), &clock, &oracle, TIMEOUT, &repo)
            .await
            .unwrap();
        let again = handle_generate_ending(&generate_ending(), &clock, &oracle, TIMEOUT, &repo)
            .await
            .unwrap();

        // Assert
        assert_eq!(outcome.progress, 100);
        assert!(outcome.finished);
        let ending = outcome.ending.unwrap();
        assert_eq!(ending.ending_text, "The treasure glitters in the dawn light.");
        assert_eq!(again.source, TextSource::Stored);
        assert_eq!(again.ending, ending);
        assert_eq!(oracle.call_count(), 1);
        assert_eq!(oracle.prompts()[0].kind, PromptKind::Ending);
        let session = load_existing("gm", &repo).await.unwrap();
        assert!(session.completed);
    }

    #[tokio::test]
    async fn test_generate_ending_falls_back_and_completes_session() {
        let clock = FixedClock(fixed_now());
        let repo = InMemorySessionRepository::new();
        seed(
            &repo,
            NarrativeState {
                progress: 100,
                flags: BTreeMap::from([("met_guide".to_owned(), serde_json::json!(true))]),
                ..NarrativeState::default()
            },
        )
        .await;

        let outcome =
            handle_generate_ending(&generate_ending(), &clock, &FailingOracle, TIMEOUT, &repo)
                .await
                .unwrap();

        assert_eq!(outcome.source, TextSource::Fallback);
        assert_eq!(outcome.ending, fallback_ending());
        let session = load_existing("gm", &repo).await.unwrap();
        assert!(session.completed);
        assert_eq!(session.narrative_state().unwrap().ending, Some(fallback_ending()));
    }

    #[tokio::test]
    async fn test_completed_story_rejects_further_choices() {
        let clock = FixedClock(fixed_now());
        let repo = InMemorySessionRepository::new();
        seed(
            &repo,
            NarrativeState {
                progress: 95,
                current_scene: Some(scene(5)),
                ..NarrativeState::default()
            },
        )
        .await;
        handle_record_choice(&record(Side::A), &clock, &FailingOracle, TIMEOUT, &repo)
            .await
            .unwrap();

        let result =
            handle_record_choice(&record(Side::A), &clock, &FailingOracle, TIMEOUT, &repo).await;

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }
}
