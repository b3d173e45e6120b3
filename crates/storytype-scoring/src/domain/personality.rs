//! The sixteen personality codes and per-pole scores.

use std::fmt;

use serde::{Serialize, Serializer};
use storytype_core::axis::{Axis, Pole};
use storytype_core::record::AnswerRecord;

/// (code, title, description) for every valid type.
const TYPE_TABLE: [(&str, &str, &str); 16] = [
    ("INTJ", "Architect", "Strategic thinker with a plan for everything"),
    ("INTP", "Logician", "Inventive thinker driven by ideas"),
    ("ENTJ", "Commander", "Bold, imaginative and strong-willed leader"),
    ("ENTP", "Debater", "Curious thinker who cannot resist a challenge"),
    ("INFJ", "Advocate", "Quiet, mystical and idealistic"),
    ("INFP", "Mediator", "Poetic, kind and altruistic"),
    ("ENFJ", "Protagonist", "Charismatic, inspiring leader"),
    ("ENFP", "Campaigner", "Enthusiastic, creative and sociable free spirit"),
    ("ISTJ", "Logistician", "Practical and fact-minded"),
    ("ISFJ", "Defender", "Dedicated and warm protector"),
    ("ESTJ", "Executive", "Excellent administrator"),
    ("ESFJ", "Consul", "Caring, social and eager to help"),
    ("ISTP", "Virtuoso", "Bold and practical experimenter"),
    ("ISFP", "Adventurer", "Flexible and charming artist"),
    ("ESTP", "Entrepreneur", "Smart, energetic and perceptive"),
    ("ESFP", "Entertainer", "Spontaneous, energetic and enthusiastic"),
];

/// A validated four-letter personality code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeCode(usize);

impl TypeCode {
    /// The code substituted whenever scoring cannot produce a valid one.
    ///
    /// Matches what the tie rule yields for an empty answer list.
    pub const FALLBACK: TypeCode = TypeCode(5);

    /// Looks up a code; `None` unless it is one of the sixteen.
    #[must_use]
    pub fn parse(code: &str) -> Option<Self> {
        TYPE_TABLE
            .iter()
            .position(|(candidate, _, _)| *candidate == code)
            .map(TypeCode)
    }

    /// Every valid code.
    pub fn all() -> impl Iterator<Item = TypeCode> {
        (0..TYPE_TABLE.len()).map(TypeCode)
    }

    /// The code as a string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        TYPE_TABLE[self.0].0
    }

    /// Short title, e.g. `"Mediator"`.
    #[must_use]
    pub fn title(self) -> &'static str {
        TYPE_TABLE[self.0].1
    }

    /// One-line description.
    #[must_use]
    pub fn description(self) -> &'static str {
        TYPE_TABLE[self.0].2
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TypeCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Vote counts for the eight poles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoleScores([u32; 8]);

impl PoleScores {
    fn slot(pole: Pole) -> usize {
        Pole::ALL
            .iter()
            .position(|candidate| *candidate == pole)
            .unwrap_or_default()
    }

    /// Count for `pole`.
    #[must_use]
    pub fn get(&self, pole: Pole) -> u32 {
        self.0[Self::slot(pole)]
    }

    /// Adds one vote for `pole`.
    pub fn increment(&mut self, pole: Pole) {
        let slot = &mut self.0[Self::slot(pole)];
        *slot = slot.saturating_add(1);
    }

    /// The winning pole of `axis`. A tie goes to the second pole.
    #[must_use]
    pub fn winner(&self, axis: Axis) -> Pole {
        let (first, second) = axis.poles();
        if self.get(first) > self.get(second) {
            first
        } else {
            second
        }
    }

    /// True when no votes were counted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|count| *count == 0)
    }
}

impl Serialize for PoleScores {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(Pole::ALL.len()))?;
        for pole in Pole::ALL {
            map.serialize_entry(&pole.letter().to_string(), &self.get(pole))?;
        }
        map.end()
    }
}

/// Scores for one axis, for reporting.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AxisScore {
    /// The axis.
    pub axis: Axis,
    /// Axis display name.
    pub name: &'static str,
    /// Votes for the first pole.
    pub first: u32,
    /// Votes for the second pole.
    pub second: u32,
    /// The pole that won.
    pub winner: Pole,
}

/// The outcome of scoring a session.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PersonalityType {
    /// The four-letter code.
    pub code: TypeCode,
    /// Per-pole vote counts.
    pub scores: PoleScores,
    /// The answers that were scored, carried for reporting.
    pub answers: Vec<Option<AnswerRecord>>,
}

impl PersonalityType {
    /// Per-axis breakdown of the scores.
    #[must_use]
    pub fn axis_scores(&self) -> Vec<AxisScore> {
        Axis::ALL
            .into_iter()
            .map(|axis| {
                let (first, second) = axis.poles();
                AxisScore {
                    axis,
                    name: axis.name(),
                    first: self.scores.get(first),
                    second: self.scores.get(second),
                    winner: self.scores.winner(axis),
                }
            })
            .collect()
    }
}
