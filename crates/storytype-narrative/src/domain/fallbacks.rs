//! Static question bank used whenever the text oracle cannot deliver.

use storytype_core::axis::Axis;
use storytype_core::record::QuestionRecord;
use storytype_core::rng::{DeterministicRng, pick};

/// (question, option A, option B); option A leans to the axis's first pole.
pub type Entry = (&'static str, &'static str, &'static str);

const EI: [Entry; 3] = [
    (
        "How do you feel about meeting new people?",
        "Meeting lots of people is fun",
        "I prefer time with a few close friends",
    ),
    (
        "Where do you get your energy from?",
        "From people and activity",
        "From time alone and reflection",
    ),
    (
        "How do you approach meetings and group work?",
        "I join in actively and speak up",
        "I usually listen",
    ),
];

const SN: [Entry; 3] = [
    (
        "When processing information, what do you focus on?",
        "Concrete facts and details",
        "Overall patterns and possibilities",
    ),
    (
        "How do you prefer to learn?",
        "Step by step, systematically",
        "Starting from the big picture",
    ),
    (
        "How do you feel about new ideas?",
        "I like practical, workable ones",
        "I like innovative, creative ones",
    ),
];

const TF: [Entry; 3] = [
    (
        "What matters most when you make a decision?",
        "Logical analysis and objectivity",
        "Values and the effect on people",
    ),
    (
        "When solving a problem, what do you weigh most?",
        "Objective facts and logic",
        "People's feelings and values",
    ),
    (
        "When judging others, what do you focus on?",
        "Ability and results",
        "Effort and motives",
    ),
];

const JP: [Entry; 3] = [
    (
        "What do you prefer in daily life?",
        "Making a plan and following it",
        "Staying flexible and improvising",
    ),
    (
        "How do you feel about deadlines?",
        "Meeting deadlines is important",
        "Deadlines can be flexible",
    ),
    (
        "How do you plan a trip?",
        "Make a detailed plan",
        "Rough plan, then go where I like",
    ),
];

/// The bank for `axis`.
#[must_use]
pub fn bank(axis: Axis) -> &'static [Entry] {
    match axis {
        Axis::EI => &EI,
        Axis::SN => &SN,
        Axis::TF => &TF,
        Axis::JP => &JP,
    }
}

/// Picks a fallback question probing `axis`.
#[must_use]
pub fn fallback_question(axis: Axis, rng: &mut dyn DeterministicRng) -> QuestionRecord {
    let (question, option_a, option_b) = pick(rng, bank(axis)).copied().unwrap_or(EI[0]);
    QuestionRecord {
        question: question.to_owned(),
        option_a: option_a.to_owned(),
        option_b: option_b.to_owned(),
        dimension: axis,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storytype_test_support::{MockRng, SequenceRng};

    #[test]
    fn test_every_axis_has_three_questions() {
        for axis in Axis::ALL {
            assert_eq!(bank(axis).len(), 3, "{axis}");
        }
    }

    #[test]
    fn test_fallback_question_keeps_requested_axis() {
        let question = fallback_question(Axis::TF, &mut MockRng);

        assert_eq!(question.dimension, Axis::TF);
        assert_eq!(question.question, TF[0].0);
    }

    #[test]
    fn test_fallback_question_follows_rng() {
        let mut rng = SequenceRng::new(vec![2, 9]);

        let third = fallback_question(Axis::JP, &mut rng);
        let clamped = fallback_question(Axis::JP, &mut rng);

        assert_eq!(third.question, JP[2].0);
        assert_eq!(clamped.question, JP[2].0);
    }
}
