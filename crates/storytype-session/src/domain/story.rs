//! Interaction modes, story settings and creator configuration.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use storytype_core::error::DomainError;

use super::narrative_state::NarrativeState;

/// Which engine drives the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModeKind {
    /// Structured question flow scheduled by narrative phase.
    FixedTurn,
    /// Open-ended scenes driven by a progress scalar.
    GameMaster,
}

impl ModeKind {
    /// Stored code for this mode.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            ModeKind::FixedTurn => "fixed-turn",
            ModeKind::GameMaster => "game-master",
        }
    }
}

impl fmt::Display for ModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ModeKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().replace('_', "-").as_str() {
            "fixed-turn" => Ok(ModeKind::FixedTurn),
            "game-master" => Ok(ModeKind::GameMaster),
            other => Err(DomainError::Validation(format!("unknown session mode: {other:?}"))),
        }
    }
}

/// Session mode with its mode-specific state.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionMode {
    /// Fixed-turn flow; needs no extra state.
    FixedTurn,
    /// Game-master flow with its narrative state.
    GameMaster(NarrativeState),
}

impl SessionMode {
    /// A fresh mode of the given kind.
    #[must_use]
    pub fn fresh(kind: ModeKind) -> Self {
        match kind {
            ModeKind::FixedTurn => SessionMode::FixedTurn,
            ModeKind::GameMaster => SessionMode::GameMaster(NarrativeState::default()),
        }
    }

    /// The kind of this mode.
    #[must_use]
    pub fn kind(&self) -> ModeKind {
        match self {
            SessionMode::FixedTurn => ModeKind::FixedTurn,
            SessionMode::GameMaster(_) => ModeKind::GameMaster,
        }
    }
}

/// The story setting questions and scenes are written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoryMode {
    /// Haunted-house thriller.
    Horror,
    /// Treasure-hunting fantasy adventure.
    Adventure,
    /// Locked-room detective story.
    Mystery,
    /// User-configured story (see [`CustomStoryConfig`]).
    Creator,
}

impl StoryMode {
    /// Stored code for this story mode.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            StoryMode::Horror => "horror",
            StoryMode::Adventure => "adventure",
            StoryMode::Mystery => "mystery",
            StoryMode::Creator => "creator",
        }
    }
}

impl fmt::Display for StoryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for StoryMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "horror" => Ok(StoryMode::Horror),
            "adventure" => Ok(StoryMode::Adventure),
            "mystery" => Ok(StoryMode::Mystery),
            "creator" => Ok(StoryMode::Creator),
            other => Err(DomainError::Validation(format!("unknown story mode: {other:?}"))),
        }
    }
}

/// Creator-mode story configuration.
///
/// Known fields are typed; anything else the user supplied is kept in
/// `extra` so it survives a round trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomStoryConfig {
    /// Where the story takes place.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setting: Option<String>,
    /// Central theme.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    /// Desired mood.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    /// Era.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_period: Option<String>,
    /// Who the protagonist is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_background: Option<String>,
    /// What the protagonist wants.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protagonist_goal: Option<String>,
    /// Items that matter to the plot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_items: Option<String>,
    /// Free-form extras.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl CustomStoryConfig {
    /// Drops blank fields so an empty form does not count as configuration.
    #[must_use]
    pub fn compact(mut self) -> Self {
        for field in [
            &mut self.setting,
            &mut self.theme,
            &mut self.mood,
            &mut self.time_period,
            &mut self.character_background,
            &mut self.protagonist_goal,
            &mut self.key_items,
        ] {
            if field.as_deref().is_some_and(|value| value.trim().is_empty()) {
                *field = None;
            }
        }
        self.extra.retain(|_, value| match value {
            serde_json::Value::Null => false,
            serde_json::Value::String(s) => !s.trim().is_empty(),
            _ => true,
        });
        self
    }

    /// True when nothing is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.setting.is_none()
            && self.theme.is_none()
            && self.mood.is_none()
            && self.time_period.is_none()
            && self.character_background.is_none()
            && self.protagonist_goal.is_none()
            && self.key_items.is_none()
            && self.extra.is_empty()
    }
}
