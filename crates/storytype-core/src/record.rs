//! Question and answer records shared by both interaction modes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::axis::Axis;
use crate::error::DomainError;

/// The side of a binary choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// First option; scores the axis's first pole.
    A,
    /// Second option; scores the axis's second pole.
    B,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => f.write_str("A"),
            Side::B => f.write_str("B"),
        }
    }
}

impl FromStr for Side {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" | "a" => Ok(Side::A),
            "B" | "b" => Ok(Side::B),
            other => Err(DomainError::Validation(format!(
                "choice must be \"A\" or \"B\", got {other:?}"
            ))),
        }
    }
}

/// A generated question awaiting an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    /// Question (or scene) text.
    pub question: String,
    /// Text of option A.
    pub option_a: String,
    /// Text of option B.
    pub option_b: String,
    /// The axis this question probes.
    pub dimension: Axis,
}

/// A recorded answer.
///
/// Questions are ephemeral, so the question text and both options are copied
/// into the answer. The dimension tag is kept as the raw stored string:
/// sessions written by older releases carry single-letter pole tags, which
/// scoring resolves on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    /// Question (or scene) text at the time of answering.
    pub question: String,
    /// Text of option A.
    pub option_a: String,
    /// Text of option B.
    pub option_b: String,
    /// The chosen side.
    pub choice: Side,
    /// Dimension tag copied from the question.
    pub dimension: String,
}

impl AnswerRecord {
    /// Builds an answer by denormalizing `question`.
    #[must_use]
    pub fn from_question(question: &QuestionRecord, choice: Side) -> Self {
        Self {
            question: question.question.clone(),
            option_a: question.option_a.clone(),
            option_b: question.option_b.clone(),
            choice,
            dimension: question.dimension.code().to_owned(),
        }
    }

    /// Text of the option that was chosen.
    #[must_use]
    pub fn chosen_text(&self) -> &str {
        match self.choice {
            Side::A => &self.option_a,
            Side::B => &self.option_b,
        }
    }

    /// The resolved axis, if the stored tag is well-formed.
    #[must_use]
    pub fn axis(&self) -> Option<Axis> {
        Axis::resolve_tag(&self.dimension)
    }
}
