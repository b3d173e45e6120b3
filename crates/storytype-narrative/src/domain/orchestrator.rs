//! Phase-driven question scheduling and prompt building.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use storytype_core::axis::Axis;
use storytype_core::oracle::{OraclePrompt, PromptKind};
use storytype_core::record::{AnswerRecord, Side};
use storytype_core::rng::{DeterministicRng, pick};
use storytype_session::domain::aggregates::Session;

use super::phase::{ARC_LENGTH, Phase};
use super::setting::StorySetting;

/// How many of the latest answers are quoted verbatim in the context.
const RECENT_ANSWERS: usize = 3;

/// Schedules fixed-turn questions across the story arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseOrchestrator {
    arc_length: usize,
}

impl Default for PhaseOrchestrator {
    fn default() -> Self {
        Self {
            arc_length: ARC_LENGTH,
        }
    }
}

impl PhaseOrchestrator {
    /// Creates an orchestrator for an arc of `arc_length` questions (at
    /// least one). Questions past the phase table belong to the resolution.
    #[must_use]
    pub fn new(arc_length: usize) -> Self {
        Self {
            arc_length: arc_length.max(1),
        }
    }

    /// Number of questions in a full run.
    #[must_use]
    pub fn arc_length(&self) -> usize {
        self.arc_length
    }

    /// 1-based number of the next question, counted from answers given.
    #[must_use]
    pub fn next_question_number(&self, session: &Session) -> usize {
        session.answered_count() + 1
    }

    /// Phase of the next question.
    #[must_use]
    pub fn current_phase(&self, session: &Session) -> Phase {
        Phase::at(self.next_question_number(session))
    }

    /// True once every question of the arc has been answered.
    #[must_use]
    pub fn is_arc_complete(&self, session: &Session) -> bool {
        session.answered_count() >= self.arc_length
    }

    /// The axis the next question should probe.
    ///
    /// The first candidate of the current phase not yet probed by an answer
    /// inside the phase wins; once all were probed, one is picked at random.
    pub fn recommended_dimension(&self, session: &Session, rng: &mut dyn DeterministicRng) -> Axis {
        let phase = self.current_phase(session);
        let range = phase.range();
        let used: BTreeSet<Axis> = session
            .answered()
            .enumerate()
            .filter(|(position, _)| range.contains(&(position + 1)))
            .filter_map(|(_, answer)| answer.axis())
            .collect();

        let candidates = phase.candidates();
        candidates
            .iter()
            .copied()
            .find(|axis| !used.contains(axis))
            .or_else(|| pick(rng, candidates).copied())
            .unwrap_or(Axis::EI)
    }

    /// Summary of the run so far: a leaning per axis for everything older
    /// than the last three answers, then those three quoted in full.
    /// `None` before the first answer.
    #[must_use]
    pub fn cumulative_context(&self, session: &Session) -> Option<String> {
        let answers: Vec<&AnswerRecord> = session.answered().collect();
        if answers.is_empty() {
            return None;
        }

        let split = answers.len().saturating_sub(RECENT_ANSWERS);
        let (older, recent) = answers.split_at(split);

        let mut out = String::new();
        if !older.is_empty() {
            let _ = writeln!(out, "[Tendencies so far] {}", summarize(older));
        }
        out.push_str("[Recent developments]");
        for (offset, answer) in recent.iter().enumerate() {
            let _ = write!(
                out,
                "\n  Question {}: {}\n  -> chose \"{}\"",
                split + offset + 1,
                answer.question,
                answer.chosen_text()
            );
        }
        Some(out)
    }

    /// Arc framing for the next question.
    #[must_use]
    pub fn story_arc_instruction(&self, session: &Session) -> String {
        let phase = self.current_phase(session);
        format!(
            "[Phase: {}] (question {}/{})\n{}",
            phase.title(),
            self.next_question_number(session),
            self.arc_length,
            phase.arc_direction()
        )
    }

    /// Builds the oracle prompt for a question probing `axis`.
    #[must_use]
    pub fn build_prompt(&self, session: &Session, axis: Axis) -> OraclePrompt {
        let phase = self.current_phase(session);
        let setting = StorySetting::for_story(session.story_mode, session.custom_story.as_ref());
        let (first, second) = axis.poles();
        let requirements = format!(
            "Dimension: {} (A = {}, B = {})\nChoice direction: {}",
            axis.name(),
            first.tendency(),
            second.tendency(),
            setting.choice_guidance(axis)
        );
        let output = format!(
            "JSON output:\n{{\"question\":\"situation (20-40 words)\",\"optionA\":\"action (3-8 words)\",\"optionB\":\"action (3-8 words)\",\"dimension\":\"{}\"}}",
            axis.code()
        );
        let arc = self.story_arc_instruction(session);

        let (system, body) = match session.last_answer() {
            None => {
                let hint = if phase == Phase::Opening {
                    " Convey the world carefully and draw the reader into the story."
                } else {
                    ""
                };
                let goal = setting
                    .protagonist_goal
                    .as_deref()
                    .map(|goal| format!("\nGoal: {goal}"))
                    .unwrap_or_default();
                (
                    format!(
                        "You are a story writer. Write the opening scene of the story and present the first choice.{hint} Reply with JSON only."
                    ),
                    format!(
                        "{arc}\n\n[Story setting]\nGenre: {}\nOpening: {}\nTone: {}{goal}\n\n[Question requirements]\n{requirements}\n\n[Writing rules]\n- question: 2-3 sentences, 20-40 words\n- Never address \"you\" or \"the protagonist\"; describe the situation only\n- options: a concrete action of 3-8 words\n- Keep it readable and concise\n\n{output}",
                        setting.atmosphere, setting.opening, setting.tone
                    ),
                )
            }
            Some(last) => {
                let chosen = last.chosen_text();
                let context = self
                    .cumulative_context(session)
                    .map(|context| format!("\n{context}\n"))
                    .unwrap_or_default();
                (
                    format!(
                        "You are a story writer. Describe the new situation as the result of the previous choice. {} Never repeat the scene description; connect naturally (\"As a result, ...\"). Reply with JSON only.",
                        phase.pacing_hint()
                    ),
                    format!(
                        "{arc}\n{context}\n[Previous] {} -> \"{chosen}\"\n\n[Next question]\nWhat happened after choosing \"{chosen}\"? Lead into a new choice.\n\nPhase: {}\n{requirements}\n\n[Writing rules]\n- question: 2-3 sentences, 20-40 words\n- Never address \"you\" or \"the protagonist\"; describe results and situation only\n- Connect from the previous choice (\"As a result, ...\", \"Then ...\")\n- Do not repeat the scene description\n- options: a concrete action of 3-8 words\n\n{output}",
                        last.question,
                        phase.instruction()
                    ),
                )
            }
        };

        OraclePrompt {
            kind: PromptKind::Question,
            dimension: Some(axis),
            system,
            body,
        }
    }
}

/// Categorical leaning per axis, in order of first appearance.
fn summarize(answers: &[&AnswerRecord]) -> String {
    let mut order: Vec<Axis> = Vec::new();
    let mut counts = [(0u32, 0u32); 4];
    for answer in answers {
        let Some(axis) = answer.axis() else { continue };
        if !order.contains(&axis) {
            order.push(axis);
        }
        let slot = &mut counts[axis.index()];
        match answer.choice {
            Side::A => slot.0 += 1,
            Side::B => slot.1 += 1,
        }
    }

    if order.is_empty() {
        return "no clear tendency yet".to_owned();
    }
    order
        .into_iter()
        .map(|axis| {
            let (a, b) = counts[axis.index()];
            let (first, second) = axis.poles();
            match a.cmp(&b) {
                std::cmp::Ordering::Greater => format!("leans {}", first.tendency()),
                std::cmp::Ordering::Less => format!("leans {}", second.tendency()),
                std::cmp::Ordering::Equal => format!("{axis}: balanced"),
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}
