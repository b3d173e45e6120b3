//! Story-arc phases.

use std::fmt;
use std::ops::RangeInclusive;

use serde::Serialize;
use storytype_core::axis::Axis;

/// Number of questions in a full story arc.
pub const ARC_LENGTH: usize = 12;

/// A phase of the story arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Questions 1–2: the world is introduced.
    Opening,
    /// Questions 3–5: trouble starts.
    Rising,
    /// Questions 6–8: the crisis.
    Climax,
    /// Questions 9–10: a way out appears.
    Falling,
    /// Questions 11–12: the story closes.
    Resolution,
}

impl Phase {
    /// Every phase in arc order.
    pub const ALL: [Phase; 5] = [
        Phase::Opening,
        Phase::Rising,
        Phase::Climax,
        Phase::Falling,
        Phase::Resolution,
    ];

    /// The phase containing 1-based question number `n`.
    ///
    /// Numbers before the arc map to the opening and numbers past it to the
    /// resolution.
    #[must_use]
    pub fn at(n: usize) -> Self {
        Self::ALL
            .into_iter()
            .find(|phase| phase.range().contains(&n))
            .unwrap_or(if n == 0 { Phase::Opening } else { Phase::Resolution })
    }

    /// Question numbers covered by this phase.
    #[must_use]
    pub fn range(self) -> RangeInclusive<usize> {
        match self {
            Phase::Opening => 1..=2,
            Phase::Rising => 3..=5,
            Phase::Climax => 6..=8,
            Phase::Falling => 9..=10,
            Phase::Resolution => 11..=12,
        }
    }

    /// Axes this phase prefers to probe, in priority order.
    #[must_use]
    pub fn candidates(self) -> &'static [Axis] {
        match self {
            Phase::Opening => &[Axis::EI, Axis::SN],
            Phase::Rising => &[Axis::TF, Axis::JP, Axis::SN],
            Phase::Climax => &[Axis::EI, Axis::TF, Axis::JP],
            Phase::Falling => &[Axis::SN, Axis::JP, Axis::TF],
            Phase::Resolution => &[Axis::TF, Axis::EI],
        }
    }

    /// Tension level of the phase.
    #[must_use]
    pub fn tension(self) -> &'static str {
        match self {
            Phase::Opening => "low",
            Phase::Rising => "building",
            Phase::Climax => "high",
            Phase::Falling => "resolving",
            Phase::Resolution => "conclusion",
        }
    }

    /// Display title.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Phase::Opening => "Opening",
            Phase::Rising => "Rising action",
            Phase::Climax => "Climax",
            Phase::Falling => "Falling action",
            Phase::Resolution => "Resolution",
        }
    }

    /// What the story does during this phase.
    #[must_use]
    pub fn arc_direction(self) -> &'static str {
        match self {
            Phase::Opening => {
                "Present the world and establish the protagonist's situation. \
                 Keep a calm pace that draws the reader in."
            }
            Phase::Rising => {
                "A problem appears and tension builds. \
                 Earlier choices start to matter and the situation grows complicated."
            }
            Phase::Climax => {
                "The greatest crisis. The consequences of every earlier choice converge. \
                 Push the tension as high as it goes and demand a decisive choice."
            }
            Phase::Falling => {
                "A way toward resolution comes into view. \
                 Hope and difficulty intertwine as the story moves toward its end."
            }
            Phase::Resolution => {
                "The story closes. Make the ending feel decided by the reader's choices \
                 while looking back over the journey and offering one last choice."
            }
        }
    }

    /// Short instruction for a question continuing the story in this phase.
    #[must_use]
    pub fn instruction(self) -> &'static str {
        match self {
            Phase::Opening => "Convey the world while pulling the reader in; a gentle development.",
            Phase::Rising => {
                "The problem deepens; give the choice weight and show the effect of the last choice."
            }
            Phase::Climax => {
                "The greatest crisis, where earlier choices converge; a dramatic turn."
            }
            Phase::Falling => "A path to resolution appears; hope and difficulty intertwine.",
            Phase::Resolution => {
                "Close the story; the reader should feel the ending is decided by this choice."
            }
        }
    }

    /// Pacing hint for the system role of a continuing question.
    #[must_use]
    pub fn pacing_hint(self) -> &'static str {
        match self {
            Phase::Opening => "Widen the world at a calm pace.",
            Phase::Rising => "Raise the tension as the problem grows serious.",
            Phase::Climax => "The greatest crisis: dramatic and tense, shaped by earlier choices.",
            Phase::Falling => "A way out begins to show; hope and hardship cross.",
            Phase::Resolution => "Close the story; the ending follows from the choices made.",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Opening => "opening",
            Phase::Rising => "rising",
            Phase::Climax => "climax",
            Phase::Falling => "falling",
            Phase::Resolution => "resolution",
        })
    }
}
