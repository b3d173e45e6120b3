//! Aggregate root for the Session & Progress context.

use chrono::{DateTime, Utc};
use storytype_core::record::{AnswerRecord, QuestionRecord};

use super::narrative_state::NarrativeState;
use super::story::{CustomStoryConfig, ModeKind, SessionMode, StoryMode};

/// Minimum number of answered questions before a run may be completed.
pub const MIN_ANSWERS_TO_COMPLETE: usize = 3;

/// One user's progress through the assessment.
///
/// `current_index` never exceeds `answers.len()`. Slots below it may be
/// `None` (skipped); every mutation keeps that invariant.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// Opaque session identifier.
    pub id: String,
    /// Active mode and its state.
    pub mode: SessionMode,
    /// Story setting, once chosen.
    pub story_mode: Option<StoryMode>,
    /// Generated questions, aligned with `answers` by position.
    pub(crate) questions: Vec<Option<QuestionRecord>>,
    /// Sparse answers indexed by question position.
    pub(crate) answers: Vec<Option<AnswerRecord>>,
    /// Position of the next question to answer.
    pub(crate) current_index: usize,
    /// Whether the run has been completed.
    pub completed: bool,
    /// Creator-mode configuration.
    pub custom_story: Option<CustomStoryConfig>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Creates an empty fixed-turn session.
    #[must_use]
    pub fn new(id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            mode: SessionMode::FixedTurn,
            story_mode: None,
            questions: Vec::new(),
            answers: Vec::new(),
            current_index: 0,
            completed: false,
            custom_story: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Position of the next question to answer.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// 1-based number of the question at `current_index`.
    #[must_use]
    pub fn current_question_number(&self) -> usize {
        self.current_index + 1
    }

    /// Sparse answer slots.
    #[must_use]
    pub fn answers(&self) -> &[Option<AnswerRecord>] {
        &self.answers
    }

    /// Generated question slots.
    #[must_use]
    pub fn questions(&self) -> &[Option<QuestionRecord>] {
        &self.questions
    }

    /// Answers that were actually given, in order.
    pub fn answered(&self) -> impl Iterator<Item = &AnswerRecord> {
        self.answers.iter().flatten()
    }

    /// Number of answered (non-skipped) questions.
    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answered().count()
    }

    /// The most recent answer given.
    #[must_use]
    pub fn last_answer(&self) -> Option<&AnswerRecord> {
        self.answered().last()
    }

    /// The question waiting at `current_index`, if one was generated.
    #[must_use]
    pub fn current_question(&self) -> Option<&QuestionRecord> {
        self.questions.get(self.current_index)?.as_ref()
    }

    /// Whether enough questions were answered to finish early.
    #[must_use]
    pub fn can_terminate_early(&self) -> bool {
        self.answered_count() >= MIN_ANSWERS_TO_COMPLETE
    }

    /// Game-master state, when in game-master mode.
    #[must_use]
    pub fn narrative_state(&self) -> Option<&NarrativeState> {
        match &self.mode {
            SessionMode::GameMaster(state) => Some(state),
            SessionMode::FixedTurn => None,
        }
    }

    /// Mutable game-master state, when in game-master mode.
    pub fn narrative_state_mut(&mut self) -> Option<&mut NarrativeState> {
        match &mut self.mode {
            SessionMode::GameMaster(state) => Some(state),
            SessionMode::FixedTurn => None,
        }
    }

    /// Stores `question` as the question at `current_index`, padding
    /// intermediate slots with `None`.
    pub fn record_question(&mut self, question: QuestionRecord, now: DateTime<Utc>) {
        let index = self.current_index;
        if self.questions.len() <= index {
            self.questions.resize(index + 1, None);
        }
        self.questions[index] = Some(question);
        self.updated_at = now;
    }

    /// Writes `answer` at `index` and moves past it.
    ///
    /// Shorter lists are padded with `None` up to `index`; the list is never
    /// truncated, so answers beyond `index` survive.
    pub fn append_answer(&mut self, index: usize, answer: AnswerRecord, now: DateTime<Utc>) {
        if self.answers.len() <= index {
            self.answers.resize(index + 1, None);
        }
        self.answers[index] = Some(answer);
        self.current_index = index + 1;
        self.updated_at = now;
    }

    /// Steps back one question, floored at zero. Answers are untouched.
    pub fn rewind(&mut self, now: DateTime<Utc>) {
        self.current_index = self.current_index.saturating_sub(1);
        self.updated_at = now;
    }

    /// Marks the run completed.
    pub fn complete(&mut self, now: DateTime<Utc>) {
        self.completed = true;
        self.updated_at = now;
    }

    /// Clears the completed flag so the run can continue.
    pub fn resume(&mut self, now: DateTime<Utc>) {
        self.completed = false;
        self.updated_at = now;
    }

    /// Switches mode; narrative state always starts over.
    pub fn switch_mode(&mut self, kind: ModeKind, now: DateTime<Utc>) {
        self.mode = SessionMode::fresh(kind);
        self.updated_at = now;
    }

    /// Chooses the story setting.
    pub fn choose_story_mode(&mut self, story_mode: StoryMode, now: DateTime<Utc>) {
        self.story_mode = Some(story_mode);
        self.updated_at = now;
    }

    /// Switches to creator mode with `config` and restarts the run.
    pub fn configure_custom_story(&mut self, config: CustomStoryConfig, now: DateTime<Utc>) {
        self.story_mode = Some(StoryMode::Creator);
        self.custom_story = Some(config).filter(|config| !config.is_empty());
        self.questions.clear();
        self.answers.clear();
        self.current_index = 0;
        self.completed = false;
        self.updated_at = now;
    }

    /// Rebuilds a session from already-validated parts.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        id: String,
        mode: SessionMode,
        story_mode: Option<StoryMode>,
        questions: Vec<Option<QuestionRecord>>,
        answers: Vec<Option<AnswerRecord>>,
        current_index: usize,
        completed: bool,
        custom_story: Option<CustomStoryConfig>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        let current_index = current_index.min(answers.len());
        Self {
            id,
            mode,
            story_mode,
            questions,
            answers,
            current_index,
            completed,
            custom_story,
            created_at,
            updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use storytype_core::axis::Axis;
    use storytype_core::record::Side;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
    }

    fn answer(text: &str) -> AnswerRecord {
        AnswerRecord {
            question: text.to_owned(),
            option_a: "yes".to_owned(),
            option_b: "no".to_owned(),
            choice: Side::A,
            dimension: "EI".to_owned(),
        }
    }

    fn question(text: &str) -> QuestionRecord {
        QuestionRecord {
            question: text.to_owned(),
            option_a: "yes".to_owned(),
            option_b: "no".to_owned(),
            dimension: Axis::SN,
        }
    }

    #[test]
    fn test_new_session_starts_empty() {
        let session = Session::new("abc", fixed_now());

        assert_eq!(session.current_index(), 0);
        assert!(session.answers().is_empty());
        assert!(!session.completed);
        assert_eq!(session.mode.kind(), ModeKind::FixedTurn);
    }

    #[test]
    fn test_append_answer_pads_sparse_slots() {
        // Arrange
        let mut session = Session::new("abc", fixed_now());
        session.append_answer(0, answer("q0"), fixed_now());
        session.append_answer(1, answer("q1"), fixed_now());

        // Act
        session.append_answer(5, answer("q5"), fixed_now());

        // Assert
        assert_eq!(session.answers().len(), 6);
        assert!(session.answers()[2..5].iter().all(Option::is_none));
        assert_eq!(session.answers()[5], Some(answer("q5")));
        assert_eq!(session.current_index(), 6);
    }

    #[test]
    fn test_append_answer_never_truncates() {
        let mut session = Session::new("abc", fixed_now());
        for index in 0..4 {
            session.append_answer(index, answer(&format!("q{index}")), fixed_now());
        }

        session.append_answer(1, answer("again"), fixed_now());

        assert_eq!(session.answers().len(), 4);
        assert_eq!(session.answers()[1], Some(answer("again")));
        assert_eq!(session.answers()[3], Some(answer("q3")));
        assert_eq!(session.current_index(), 2);
    }

    #[test]
    fn test_rewind_keeps_answers_and_floors_at_zero() {
        let mut session = Session::new("abc", fixed_now());
        session.append_answer(0, answer("q0"), fixed_now());

        session.rewind(fixed_now());
        session.rewind(fixed_now());

        assert_eq!(session.current_index(), 0);
        assert_eq!(session.answers().len(), 1);
        assert_eq!(session.answers()[0], Some(answer("q0")));
    }

    #[test]
    fn test_record_question_targets_current_index() {
        let mut session = Session::new("abc", fixed_now());
        session.append_answer(2, answer("q2"), fixed_now());

        session.record_question(question("next"), fixed_now());

        assert_eq!(session.questions().len(), 4);
        assert_eq!(session.current_question(), Some(&question("next")));
    }

    #[test]
    fn test_can_terminate_early_counts_only_answered_slots() {
        let mut session = Session::new("abc", fixed_now());
        session.append_answer(4, answer("q4"), fixed_now());
        session.append_answer(5, answer("q5"), fixed_now());
        assert!(!session.can_terminate_early());

        session.append_answer(6, answer("q6"), fixed_now());
        assert!(session.can_terminate_early());
    }

    #[test]
    fn test_switch_mode_resets_narrative_state() {
        let mut session = Session::new("abc", fixed_now());
        session.switch_mode(ModeKind::GameMaster, fixed_now());
        session.narrative_state_mut().unwrap().progress = 40;

        session.switch_mode(ModeKind::GameMaster, fixed_now());

        assert_eq!(session.narrative_state().unwrap().progress, 0);
    }

    #[test]
    fn test_configure_custom_story_restarts_the_run() {
        let mut session = Session::new("abc", fixed_now());
        session.append_answer(0, answer("q0"), fixed_now());
        session.complete(fixed_now());
        let config = CustomStoryConfig {
            setting: Some("Undersea lab".to_owned()),
            ..CustomStoryConfig::default()
        };

        session.configure_custom_story(config, fixed_now());

        assert_eq!(session.story_mode, Some(StoryMode::Creator));
        assert!(session.custom_story.is_some());
        assert!(session.answers().is_empty());
        assert_eq!(session.current_index(), 0);
        assert!(!session.completed);
    }

    #[test]
    fn test_from_parts_clamps_index_to_answer_count() {
        let session = Session::from_parts(
            "abc".to_owned(),
            SessionMode::FixedTurn,
            None,
            Vec::new(),
            vec![Some(answer("q0"))],
            9,
            false,
            None,
            fixed_now(),
            fixed_now(),
        );

        assert_eq!(session.current_index(), 1);
    }
}
