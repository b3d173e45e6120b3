//! Static scenes and ending used when the text oracle cannot deliver.

use storytype_core::axis::Axis;
use storytype_session::domain::narrative_state::{Ending, Scene, SceneChoice};

fn choice(text: &str) -> SceneChoice {
    SceneChoice {
        text: text.to_owned(),
        progress_impact: SceneChoice::DEFAULT_IMPACT,
    }
}

/// A fixed scene probing `axis`.
#[must_use]
pub fn fallback_scene(axis: Axis) -> Scene {
    let (scene_text, a, b) = match axis {
        Axis::EI => (
            "Deep in a mysterious forest. Two paths open up ahead.",
            "Take the left path",
            "Take the right path",
        ),
        Axis::SN => (
            "In front of an old building. A strange sound comes from behind the door.",
            "Investigate the source of the sound",
            "Imagine what the sound could mean",
        ),
        Axis::TF => (
            "Someone nearby is clearly in trouble. Whether to help is not obvious.",
            "Weigh the situation logically",
            "Go with what feels right",
        ),
        Axis::JP => (
            "Something unexpected happens. A response has to be decided.",
            "Draw up a plan",
            "Adapt as things unfold",
        ),
    };
    Scene {
        scene_text: scene_text.to_owned(),
        dimension: axis,
        choice_a: choice(a),
        choice_b: choice(b),
    }
}

/// The ending used when none can be generated.
#[must_use]
pub fn fallback_ending() -> Ending {
    Ending {
        ending_text: "The story came to a safe conclusion.".to_owned(),
        analysis: "The choices made reveal a well-balanced set of traits.".to_owned(),
        personality_insights: "Able to make sound judgments across many kinds of situations."
            .to_owned(),
        achievement: "Completed the adventure.".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_scene_probes_requested_axis_with_default_impact() {
        for axis in Axis::ALL {
            let scene = fallback_scene(axis);

            assert_eq!(scene.dimension, axis);
            assert_eq!(scene.choice_a.progress_impact, 5);
            assert_eq!(scene.choice_b.progress_impact, 5);
            assert_ne!(scene.choice_a.text, scene.choice_b.text);
        }
    }

    #[test]
    fn test_fallback_ending_is_fully_populated() {
        let ending = fallback_ending();

        assert!(!ending.ending_text.is_empty());
        assert!(!ending.analysis.is_empty());
        assert!(!ending.personality_insights.is_empty());
        assert!(!ending.achievement.is_empty());
    }
}
