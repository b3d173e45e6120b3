//! Command handlers for the Narrative Phase Orchestration context.

use std::sync::Mutex;
use std::time::Duration;

use serde::Serialize;
use storytype_core::axis::Axis;
use storytype_core::clock::Clock;
use storytype_core::command::Command;
use storytype_core::error::DomainError;
use storytype_core::oracle::{OracleError, OracleResponse, TextOracle, consult};
use storytype_core::record::QuestionRecord;
use storytype_core::repository::SessionRepository;
use storytype_core::rng::{DeterministicRng, with_locked};
use storytype_session::application::command_handlers::{find_or_create, save};
use storytype_session::domain::story::ModeKind;
use tracing::{debug, info, warn};

use crate::domain::commands::RequestNextQuestion;
use crate::domain::fallbacks::fallback_question;
use crate::domain::orchestrator::PhaseOrchestrator;
use crate::domain::phase::Phase;

/// Where a returned question came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionSource {
    /// Already generated for this index and not yet answered.
    Pending,
    /// Freshly generated by the text oracle.
    Oracle,
    /// Taken from the static bank.
    Fallback,
}

/// The question to show next.
#[derive(Debug, Clone, Serialize)]
pub struct NextQuestion {
    /// The question.
    pub question: QuestionRecord,
    /// 1-based position of the question in the run.
    pub question_number: usize,
    /// Arc length the run is measured against.
    pub total_questions: usize,
    /// Phase of the story arc.
    pub phase: Phase,
    /// Tension level of the phase.
    pub tension: &'static str,
    /// Where the question came from.
    pub source: QuestionSource,
}

/// Turns an oracle reply into a question probing `axis`.
///
/// The requested axis is authoritative; a differing tag in the reply is only
/// logged.
fn question_from_response(
    response: OracleResponse,
    axis: Axis,
) -> Result<QuestionRecord, OracleError> {
    let question = response.main_text.trim();
    let option_a = response.choice_a.trim();
    let option_b = response.choice_b.trim();
    if question.is_empty() || option_a.is_empty() || option_b.is_empty() {
        return Err(OracleError::Malformed(
            "question or options missing from reply".to_owned(),
        ));
    }

    if let Some(tag) = response.dimension_tag.as_deref() {
        let returned = tag.parse::<Axis>().ok().or_else(|| Axis::resolve_tag(tag));
        if returned != Some(axis) {
            debug!(requested = %axis, tag, "oracle tagged the question with another axis");
        }
    }

    Ok(QuestionRecord {
        question: question.to_owned(),
        option_a: option_a.to_owned(),
        option_b: option_b.to_owned(),
        dimension: axis,
    })
}

/// Handles `RequestNextQuestion`: returns the question pending at the current
/// index, or generates one, records it and persists the session.
///
/// Oracle failures never surface: the static bank supplies the question.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a blank id, a session outside
/// fixed-turn mode, a completed session, or a finished arc. Propagates
/// repository failures.
pub async fn handle_next_question(
    command: &RequestNextQuestion,
    orchestrator: &PhaseOrchestrator,
    clock: &dyn Clock,
    rng: &Mutex<dyn DeterministicRng + Send>,
    oracle: &dyn TextOracle,
    oracle_timeout: Duration,
    repo: &dyn SessionRepository,
) -> Result<NextQuestion, DomainError> {
    info!(
        command_type = command.command_type(),
        correlation_id = %command.correlation_id,
        session_id = %command.session_id,
        "handling command"
    );

    let mut session = find_or_create(&command.session_id, clock, repo).await?;
    if session.mode.kind() != ModeKind::FixedTurn {
        return Err(DomainError::Validation(
            "questions are only served in fixed-turn mode".to_owned(),
        ));
    }
    if session.completed {
        return Err(DomainError::Validation(format!(
            "session {} is already completed",
            session.id
        )));
    }

    // Phase and tension follow the number of the question actually returned,
    // which after a rewind can lag the answered count.
    let respond = |question: QuestionRecord, question_number: usize, source| {
        let phase = Phase::at(question_number);
        NextQuestion {
            question,
            question_number,
            total_questions: orchestrator.arc_length(),
            phase,
            tension: phase.tension(),
            source,
        }
    };

    if let Some(pending) = session.current_question() {
        return Ok(respond(
            pending.clone(),
            session.current_question_number(),
            QuestionSource::Pending,
        ));
    }
    if orchestrator.is_arc_complete(&session) {
        return Err(DomainError::Validation(format!(
            "all {} questions have been answered",
            orchestrator.arc_length()
        )));
    }

    let phase = orchestrator.current_phase(&session);
    let axis = with_locked(rng, |rng| orchestrator.recommended_dimension(&session, rng))?;
    let prompt = orchestrator.build_prompt(&session, axis);
    debug!(
        session_id = %session.id,
        phase = %phase,
        dimension = %axis,
        prompt_chars = prompt.body.len(),
        "requesting question from oracle"
    );

    let generated = consult(oracle, &prompt, oracle_timeout)
        .await
        .and_then(|response| question_from_response(response, axis));
    let (question, source) = match generated {
        Ok(question) => (question, QuestionSource::Oracle),
        Err(e) => {
            warn!(session_id = %session.id, dimension = %axis, error = %e, "question generation failed; using fallback bank");
            let question = with_locked(rng, |rng| fallback_question(axis, rng))?;
            (question, QuestionSource::Fallback)
        }
    };

    session.record_question(question.clone(), clock.now());
    save(&session, repo).await?;
    info!(session_id = %session.id, phase = %phase, dimension = %axis, source = ?source, "question recorded");

    Ok(respond(question, session.current_question_number(), source))
}
