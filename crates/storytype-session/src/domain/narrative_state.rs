//! Game-master narrative state.
//!
//! Stored as a JSON document alongside the session. Every field
//! deserializes leniently: a missing or malformed value reads as its default
//! rather than failing the whole session load.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use storytype_core::axis::Axis;
use tracing::warn;

/// Upper bound of the progress scalar.
pub const MAX_PROGRESS: u8 = 100;

/// How many scenes may probe the same axis before it is rested.
pub const MAX_DIMENSION_USES: u8 = 5;

fn count_from(value: &Value) -> u8 {
    let count = value.as_u64().unwrap_or_default();
    u8::try_from(count.min(u64::from(MAX_DIMENSION_USES))).unwrap_or_default()
}

fn progress_from(value: &Value) -> u8 {
    let raw = value
        .as_i64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
        .unwrap_or_default();
    u8::try_from(raw.clamp(0, i64::from(MAX_PROGRESS))).unwrap_or_default()
}

/// Decodes the first of `keys` present in `fields`, falling back to the
/// default when it is absent, null or the wrong shape.
fn field<T: DeserializeOwned + Default>(fields: &Map<String, Value>, keys: &[&str]) -> T {
    let Some((key, value)) = keys
        .iter()
        .find_map(|key| fields.get(*key).filter(|v| !v.is_null()).map(|v| (*key, v)))
    else {
        return T::default();
    };
    T::deserialize(value).unwrap_or_else(|error| {
        warn!(field = key, %error, "malformed narrative field; using default");
        T::default()
    })
}

/// Per-axis scene counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DimensionUsage {
    #[serde(rename = "EI")]
    ei: u8,
    #[serde(rename = "SN")]
    sn: u8,
    #[serde(rename = "TF")]
    tf: u8,
    #[serde(rename = "JP")]
    jp: u8,
}

impl<'de> Deserialize<'de> for DimensionUsage {
    /// Accepts `EI` and `E_I` style keys. When both spellings of an axis are
    /// present the larger count wins; anything that is not an object reads as
    /// all zeroes.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut usage = Self::default();
        let Value::Object(counts) = Value::deserialize(deserializer)? else {
            return Ok(usage);
        };
        for (key, count) in &counts {
            let Ok(axis) = key.parse::<Axis>() else {
                continue;
            };
            let slot = usage.slot(axis);
            *slot = (*slot).max(count_from(count));
        }
        Ok(usage)
    }
}

impl DimensionUsage {
    fn slot(&mut self, axis: Axis) -> &mut u8 {
        match axis {
            Axis::EI => &mut self.ei,
            Axis::SN => &mut self.sn,
            Axis::TF => &mut self.tf,
            Axis::JP => &mut self.jp,
        }
    }

    /// Number of scenes that have probed `axis` since the last reset.
    #[must_use]
    pub fn get(&self, axis: Axis) -> u8 {
        match axis {
            Axis::EI => self.ei,
            Axis::SN => self.sn,
            Axis::TF => self.tf,
            Axis::JP => self.jp,
        }
    }

    /// Counts one more scene for `axis`, saturating at [`MAX_DIMENSION_USES`].
    pub fn increment(&mut self, axis: Axis) {
        let slot = self.slot(axis);
        *slot = slot.saturating_add(1).min(MAX_DIMENSION_USES);
    }

    /// Zeroes every counter.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// One of the two choices offered by a scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneChoice {
    /// Choice label.
    pub text: String,
    /// How far this choice moves the story toward its ending.
    #[serde(default = "SceneChoice::default_impact")]
    pub progress_impact: i32,
}

impl SceneChoice {
    /// Progress added by a choice unless the scene says otherwise.
    pub const DEFAULT_IMPACT: i32 = 5;

    fn default_impact() -> i32 {
        Self::DEFAULT_IMPACT
    }
}

/// A generated game-master scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    /// Scene prose.
    pub scene_text: String,
    /// The axis the two choices probe.
    #[serde(alias = "question_dimension")]
    pub dimension: Axis,
    /// Choice A (scores the axis's first pole).
    pub choice_a: SceneChoice,
    /// Choice B (scores the axis's second pole).
    pub choice_b: SceneChoice,
}

/// The story's ending and the personality reading that goes with it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ending {
    /// Ending prose.
    pub ending_text: String,
    /// Reading of the choices made.
    #[serde(alias = "mbti_analysis")]
    pub analysis: String,
    /// Personality insights.
    pub personality_insights: String,
    /// One-line summary of what was achieved.
    pub achievement: String,
}

/// Game-master state carried by a session.
///
/// Decoding is field by field: a malformed entry resets only itself, so a
/// bad counter map never costs the story its progress or goal.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NarrativeState {
    /// Completion scalar, 0–100.
    pub progress: u8,
    /// The story's goal, chosen on initialization.
    pub goal: Option<String>,
    /// Items collected so far.
    pub inventory: Vec<String>,
    /// Named story flags.
    pub flags: BTreeMap<String, Value>,
    /// Scenes generated per axis.
    pub dimension_usage_counts: DimensionUsage,
    /// One line per recorded choice.
    pub history: Vec<String>,
    /// The scene awaiting a choice.
    pub current_scene: Option<Scene>,
    /// The ending, once generated.
    pub ending: Option<Ending>,
}

impl<'de> Deserialize<'de> for NarrativeState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let Value::Object(fields) = value else {
            if !value.is_null() {
                warn!("narrative state is not an object; starting over");
            }
            return Ok(Self::default());
        };

        Ok(Self {
            progress: fields.get("progress").map(progress_from).unwrap_or_default(),
            goal: field(&fields, &["goal"]),
            inventory: field(&fields, &["inventory"]),
            flags: field(&fields, &["flags"]),
            dimension_usage_counts: field(&fields, &["dimension_usage_counts", "dimension_counts"]),
            history: field(&fields, &["history"]),
            current_scene: field(&fields, &["current_scene"]),
            ending: field(&fields, &["ending", "ending_data"]),
        })
    }
}

impl NarrativeState {
    /// True once progress has reached [`MAX_PROGRESS`].
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.progress >= MAX_PROGRESS
    }
}
