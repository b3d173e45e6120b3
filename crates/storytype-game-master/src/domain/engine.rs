//! Progress-driven narrative engine.
//!
//! Every function threads the [`NarrativeState`] explicitly and returns
//! plain values; nothing here performs I/O.

use storytype_core::axis::{Axis, Pole};
use storytype_core::oracle::{AuxiliaryUpdates, OracleError, OracleResponse, note_keys};
use storytype_core::rng::{DeterministicRng, pick};
use storytype_session::domain::narrative_state::{
    DimensionUsage, Ending, MAX_DIMENSION_USES, MAX_PROGRESS, NarrativeState, Scene, SceneChoice,
};
use storytype_session::domain::story::{CustomStoryConfig, StoryMode};
use tracing::{debug, warn};

use super::fallbacks::fallback_ending;
use super::goals::{configured_goal, goal_templates};

/// Starts a new story: picks a goal and clears inventory, flags, history and
/// axis usage.
///
/// Only a story that has neither progress nor a goal is initialized; returns
/// whether it was.
pub fn initialize(
    state: &mut NarrativeState,
    story_mode: Option<StoryMode>,
    custom: Option<&CustomStoryConfig>,
    rng: &mut dyn DeterministicRng,
) -> bool {
    if state.progress != 0 || state.goal.is_some() {
        return false;
    }

    let goal = configured_goal(custom)
        .or_else(|| pick(rng, goal_templates(story_mode)).copied())
        .map(str::to_owned);
    *state = NarrativeState {
        goal,
        ..NarrativeState::default()
    };
    true
}

/// Axes that may still be probed. When every axis has been used
/// [`MAX_DIMENSION_USES`] times the counters are reset and all four return.
pub fn available_dimensions(usage: &mut DimensionUsage) -> Vec<Axis> {
    let available: Vec<Axis> = Axis::ALL
        .into_iter()
        .filter(|axis| usage.get(*axis) < MAX_DIMENSION_USES)
        .collect();
    if !available.is_empty() {
        return available;
    }

    debug!("every axis used up; resetting usage counters");
    usage.reset();
    Axis::ALL.to_vec()
}

/// Picks the axis for the next scene and counts it as used.
pub fn select_dimension(state: &mut NarrativeState, rng: &mut dyn DeterministicRng) -> Axis {
    let available = available_dimensions(&mut state.dimension_usage_counts);
    let axis = pick(rng, &available).copied().unwrap_or(Axis::EI);
    state.dimension_usage_counts.increment(axis);
    axis
}

/// Adds new inventory items and merges flag updates.
pub fn merge_updates(state: &mut NarrativeState, updates: &AuxiliaryUpdates) {
    state.inventory.extend(
        updates
            .inventory
            .iter()
            .map(|item| item.trim())
            .filter(|item| !item.is_empty())
            .map(str::to_owned),
    );
    state
        .flags
        .extend(updates.flags.iter().map(|(key, value)| (key.clone(), value.clone())));
}

fn impact(updates: &AuxiliaryUpdates, key: &str) -> i32 {
    let Some(raw) = updates.notes.get(key) else {
        return SceneChoice::DEFAULT_IMPACT;
    };
    raw.trim().parse().unwrap_or_else(|_| {
        warn!(key, raw = %raw, "unparseable progress impact; using default");
        SceneChoice::DEFAULT_IMPACT
    })
}

/// Builds a scene probing `axis` from an oracle reply.
///
/// The selected axis is authoritative; the oracle's own tag is ignored.
///
/// # Errors
///
/// Returns `OracleError::Malformed` when the scene text or a choice label is
/// blank.
pub fn scene_from_response(response: &OracleResponse, axis: Axis) -> Result<Scene, OracleError> {
    let scene_text = response.main_text.trim();
    let a = response.choice_a.trim();
    let b = response.choice_b.trim();
    if scene_text.is_empty() || a.is_empty() || b.is_empty() {
        return Err(OracleError::Malformed(
            "scene text or choices missing from reply".to_owned(),
        ));
    }

    Ok(Scene {
        scene_text: scene_text.to_owned(),
        dimension: axis,
        choice_a: SceneChoice {
            text: a.to_owned(),
            progress_impact: impact(&response.auxiliary, note_keys::IMPACT_A),
        },
        choice_b: SceneChoice {
            text: b.to_owned(),
            progress_impact: impact(&response.auxiliary, note_keys::IMPACT_B),
        },
    })
}

/// Builds an ending from an oracle reply; missing reading fields fall back
/// to the static ending's text.
///
/// # Errors
///
/// Returns `OracleError::Malformed` when the ending text is blank.
pub fn ending_from_response(response: &OracleResponse) -> Result<Ending, OracleError> {
    let ending_text = response.main_text.trim();
    if ending_text.is_empty() {
        return Err(OracleError::Malformed("ending text missing from reply".to_owned()));
    }

    let fallback = fallback_ending();
    let note = |key: &str, default: String| {
        response
            .auxiliary
            .notes
            .get(key)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .map_or(default, str::to_owned)
    };
    Ok(Ending {
        ending_text: ending_text.to_owned(),
        analysis: note(note_keys::ANALYSIS, fallback.analysis),
        personality_insights: note(note_keys::INSIGHTS, fallback.personality_insights),
        achievement: note(note_keys::ACHIEVEMENT, fallback.achievement),
    })
}

/// History line for a choice whose label is unknown.
#[must_use]
pub fn choice_description(pole: Pole) -> String {
    let action = match pole {
        Pole::E => "An outgoing action",
        Pole::I => "An inward-looking action",
        Pole::S => "A grounded judgment",
        Pole::N => "An intuitive judgment",
        Pole::T => "Logical thinking",
        Pole::F => "A heartfelt judgment",
        Pole::J => "A planned action",
        Pole::P => "A flexible response",
    };
    format!("{action} chosen")
}

/// Applies a choice: moves progress by `delta` within 0–100 and appends
/// `description` to the history.
///
/// Returns true when this choice brought the story to its end.
pub fn record_choice(state: &mut NarrativeState, delta: i32, description: String) -> bool {
    let was_finished = state.is_finished();
    let progress = (i32::from(state.progress).saturating_add(delta)).clamp(0, i32::from(MAX_PROGRESS));
    state.progress = u8::try_from(progress).unwrap_or(MAX_PROGRESS);
    state.history.push(description);
    !was_finished && state.is_finished()
}
