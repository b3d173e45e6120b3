//! Tally-and-compare scoring.

use storytype_core::axis::Axis;
use storytype_core::record::{AnswerRecord, Side};
use tracing::warn;

use super::personality::{PersonalityType, PoleScores, TypeCode};

/// Adds one vote for the pole selected by `side` on the axis named by `tag`.
///
/// Malformed tags are skipped with a diagnostic.
fn vote(scores: &mut PoleScores, position: usize, tag: &str, side: Side) {
    let Some(axis) = Axis::resolve_tag(tag) else {
        warn!(position, tag, "skipping answer with unrecognized dimension tag");
        return;
    };
    let (first, second) = axis.poles();
    match side {
        Side::A => scores.increment(first),
        Side::B => scores.increment(second),
    }
}

fn code_for(scores: &PoleScores) -> TypeCode {
    let code: String = Axis::ALL
        .into_iter()
        .map(|axis| scores.winner(axis).letter())
        .collect();
    TypeCode::parse(&code).unwrap_or_else(|| {
        warn!(code = %code, "scored code is not a valid type; using fallback");
        TypeCode::FALLBACK
    })
}

/// Scores a sparse answer list. Skipped (`None`) slots are ignored.
#[must_use]
pub fn calculate(answers: &[Option<AnswerRecord>]) -> PersonalityType {
    let mut scores = PoleScores::default();
    for (position, answer) in answers.iter().enumerate() {
        if let Some(answer) = answer {
            vote(&mut scores, position, &answer.dimension, answer.choice);
        }
    }

    let code = if answers.iter().all(Option::is_none) {
        TypeCode::FALLBACK
    } else {
        code_for(&scores)
    };

    PersonalityType {
        code,
        scores,
        answers: answers.to_vec(),
    }
}
