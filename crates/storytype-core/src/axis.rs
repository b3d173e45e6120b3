//! Personality axes and poles.
//!
//! Every question probes exactly one [`Axis`]. Choosing option `A` scores the
//! axis's first pole, option `B` its second.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// One of the four bipolar personality dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Extraversion / Introversion.
    #[serde(alias = "E_I")]
    EI,
    /// Sensing / Intuition.
    #[serde(alias = "S_N")]
    SN,
    /// Thinking / Feeling.
    #[serde(alias = "T_F")]
    TF,
    /// Judging / Perceiving.
    #[serde(alias = "J_P")]
    JP,
}

impl Axis {
    /// All axes in canonical order.
    pub const ALL: [Axis; 4] = [Axis::EI, Axis::SN, Axis::TF, Axis::JP];

    /// The two-letter axis code.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Axis::EI => "EI",
            Axis::SN => "SN",
            Axis::TF => "TF",
            Axis::JP => "JP",
        }
    }

    /// The (first, second) poles of this axis.
    #[must_use]
    pub fn poles(self) -> (Pole, Pole) {
        match self {
            Axis::EI => (Pole::E, Pole::I),
            Axis::SN => (Pole::S, Pole::N),
            Axis::TF => (Pole::T, Pole::F),
            Axis::JP => (Pole::J, Pole::P),
        }
    }

    /// Position of this axis in [`Axis::ALL`].
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Axis::EI => 0,
            Axis::SN => 1,
            Axis::TF => 2,
            Axis::JP => 3,
        }
    }

    /// Human-readable axis name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Axis::EI => "Extraversion/Introversion",
            Axis::SN => "Sensing/Intuition",
            Axis::TF => "Thinking/Feeling",
            Axis::JP => "Judging/Perceiving",
        }
    }

    /// Resolves a stored dimension tag to its axis.
    ///
    /// Accepts a two-character axis code (`"TF"`) or a legacy single pole
    /// letter (`"T"`), which maps to its parent axis. Anything else is `None`.
    #[must_use]
    pub fn resolve_tag(tag: &str) -> Option<Self> {
        match tag.len() {
            2 => Self::ALL.into_iter().find(|axis| axis.code() == tag),
            1 => tag.chars().next().and_then(Pole::from_letter).map(Pole::axis),
            _ => None,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Axis {
    type Err = DomainError;

    /// Parses `EI` style codes as well as the underscore form (`E_I`) that
    /// older game-master state used for its usage counters.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.trim().chars().filter(|c| *c != '_').collect();
        Self::ALL
            .into_iter()
            .find(|axis| axis.code().eq_ignore_ascii_case(&compact))
            .ok_or_else(|| DomainError::DataFormat(format!("unknown axis code: {s:?}")))
    }
}

/// One endpoint of an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Pole {
    /// Extraversion.
    E,
    /// Introversion.
    I,
    /// Sensing.
    S,
    /// Intuition.
    N,
    /// Thinking.
    T,
    /// Feeling.
    F,
    /// Judging.
    J,
    /// Perceiving.
    P,
}

impl Pole {
    /// All poles, first/second pole of each axis in canonical axis order.
    pub const ALL: [Pole; 8] = [
        Pole::E,
        Pole::I,
        Pole::S,
        Pole::N,
        Pole::T,
        Pole::F,
        Pole::J,
        Pole::P,
    ];

    /// The pole's letter.
    #[must_use]
    pub fn letter(self) -> char {
        match self {
            Pole::E => 'E',
            Pole::I => 'I',
            Pole::S => 'S',
            Pole::N => 'N',
            Pole::T => 'T',
            Pole::F => 'F',
            Pole::J => 'J',
            Pole::P => 'P',
        }
    }

    /// Parses a single upper-case pole letter.
    #[must_use]
    pub fn from_letter(letter: char) -> Option<Self> {
        Self::ALL.into_iter().find(|pole| pole.letter() == letter)
    }

    /// The axis this pole belongs to.
    #[must_use]
    pub fn axis(self) -> Axis {
        match self {
            Pole::E | Pole::I => Axis::EI,
            Pole::S | Pole::N => Axis::SN,
            Pole::T | Pole::F => Axis::TF,
            Pole::J | Pole::P => Axis::JP,
        }
    }

    /// Adjective used when summarizing a leaning toward this pole.
    #[must_use]
    pub fn tendency(self) -> &'static str {
        match self {
            Pole::E => "outgoing",
            Pole::I => "reserved",
            Pole::S => "concrete",
            Pole::N => "imaginative",
            Pole::T => "logical",
            Pole::F => "empathetic",
            Pole::J => "planned",
            Pole::P => "flexible",
        }
    }
}

impl fmt::Display for Pole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}
