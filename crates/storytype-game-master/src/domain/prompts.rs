//! Oracle prompts for scenes and endings.

use storytype_core::axis::Axis;
use storytype_core::oracle::{OraclePrompt, PromptKind};
use storytype_narrative::domain::setting::StorySetting;
use storytype_session::domain::narrative_state::NarrativeState;
use storytype_session::domain::story::{CustomStoryConfig, StoryMode};

use super::goals::world_context;

const SCENE_SYSTEM: &str = "You are the game master of an interactive novel that reveals the reader's personality. \
     Manage the story's progress and write choices that make personality traits visible. \
     Reply with the requested JSON only.";

const ENDING_SYSTEM: &str = "You are a story writer. Write a grand, satisfying ending from the history of choices \
     and analyze the traits those choices revealed. Never call anyone \"the protagonist\", \
     \"you\" or \"the player\"; use a fitting name such as \"the traveler\" or omit the subject. \
     Reply with the requested JSON only.";

fn joined_or_none(items: &[String], separator: &str) -> String {
    if items.is_empty() {
        "none".to_owned()
    } else {
        items.join(separator)
    }
}

/// Prompt for the next scene, which must probe `axis`.
#[must_use]
pub fn scene_prompt(
    state: &NarrativeState,
    story_mode: Option<StoryMode>,
    custom: Option<&CustomStoryConfig>,
    axis: Axis,
    available: &[Axis],
) -> OraclePrompt {
    let setting = StorySetting::for_story(story_mode, custom);
    let context = match story_mode {
        Some(StoryMode::Creator) => setting.opening.as_str(),
        _ => world_context(story_mode),
    };
    let snapshot = serde_json::json!({
        "progress": state.progress,
        "goal": state.goal,
        "inventory": state.inventory,
        "flags": state.flags,
        "history": state.history,
        "dimension_usage_counts": state.dimension_usage_counts,
    });
    let available = available
        .iter()
        .map(|axis| axis.code())
        .collect::<Vec<_>>()
        .join(", ");
    let (first, second) = axis.poles();

    let body = format!(
        "# Rules\n\
         - Genre: {atmosphere}. World: {context}.\n\
         - Move the story a little closer to its goal with every scene.\n\
         - The two choices must reveal the {name} axis (A = {a}, B = {b}): {guidance}.\n\
         - Keep the story consistent and let choices matter.\n\
         - Keep the scene and the choices short; never address \"you\" or \"the protagonist\".\n\
         - Never put pole letters such as (T) or (E) into choice text.\n\n\
         # Current story state\n{snapshot}\n\n\
         # Axes\nAvailable: {available}\nSelected: {code}\n\n\
         # Output format\n\
         {{\"scene_text\":\"the next scene\",\"question_dimension\":\"{code}\",\
         \"choices\":[{{\"text\":\"choice A\",\"value\":\"{a_letter}\",\"progress_impact\":5}},\
         {{\"text\":\"choice B\",\"value\":\"{b_letter}\",\"progress_impact\":5}}],\
         \"inventory_updates\":[\"new item\"],\"flag_updates\":{{\"new_flag\":true}}}}",
        atmosphere = setting.atmosphere,
        name = axis.name(),
        a = first.tendency(),
        b = second.tendency(),
        guidance = setting.choice_guidance(axis),
        code = axis.code(),
        a_letter = first.letter(),
        b_letter = second.letter(),
    );

    OraclePrompt {
        kind: PromptKind::Scene,
        dimension: Some(axis),
        system: SCENE_SYSTEM.to_owned(),
        body,
    }
}

/// Prompt for the ending of a finished story.
#[must_use]
pub fn ending_prompt(state: &NarrativeState) -> OraclePrompt {
    let flags: Vec<String> = state.flags.keys().cloned().collect();
    let body = format!(
        "# Story\n\
         - Goal: {goal}\n\
         - Final progress: {progress}%\n\
         - Inventory: {inventory}\n\
         - Key events: {flags}\n\
         - Choices: {history}\n\n\
         # Output format\n\
         {{\"ending_text\":\"the ending, third person\",\"mbti_analysis\":\"reading of the choices\",\
         \"personality_insights\":\"insights\",\"achievement\":\"one line\"}}",
        goal = state.goal.as_deref().unwrap_or("none"),
        progress = state.progress,
        inventory = joined_or_none(&state.inventory, ", "),
        flags = joined_or_none(&flags, ", "),
        history = joined_or_none(&state.history, " → "),
    );

    OraclePrompt {
        kind: PromptKind::Ending,
        dimension: None,
        system: ENDING_SYSTEM.to_owned(),
        body,
    }
}
