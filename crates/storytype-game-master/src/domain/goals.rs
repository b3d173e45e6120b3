//! Story goals and world context per story mode.

use storytype_session::domain::story::{CustomStoryConfig, StoryMode};

const HORROR_GOALS: [&str; 4] = [
    "Escape the cursed mansion",
    "Solve the mystery of the old mansion",
    "Lift the evil spirit's curse",
    "Save the lost soul",
];

const ADVENTURE_GOALS: [&str; 4] = [
    "Find the lost treasure",
    "Explore the ancient ruins",
    "Obtain the legendary sword",
    "Save the magic kingdom",
];

const MYSTERY_GOALS: [&str; 4] = [
    "Uncover the truth behind the murder",
    "Recover the stolen jewel",
    "Expose the spy",
    "Stop the organization's conspiracy",
];

/// Goal templates a new story picks from. Creator stories and stories
/// without a mode use the adventure set.
#[must_use]
pub fn goal_templates(story_mode: Option<StoryMode>) -> &'static [&'static str] {
    match story_mode {
        Some(StoryMode::Horror) => &HORROR_GOALS,
        Some(StoryMode::Mystery) => &MYSTERY_GOALS,
        Some(StoryMode::Adventure | StoryMode::Creator) | None => &ADVENTURE_GOALS,
    }
}

/// The goal a creator configured for the protagonist, if any.
#[must_use]
pub fn configured_goal(custom: Option<&CustomStoryConfig>) -> Option<&str> {
    custom?
        .protagonist_goal
        .as_deref()
        .map(str::trim)
        .filter(|goal| !goal.is_empty())
}

/// Short description of the world a story mode plays in.
#[must_use]
pub fn world_context(story_mode: Option<StoryMode>) -> &'static str {
    match story_mode {
        Some(StoryMode::Horror) => "Dark night roads, an old mansion, a world of uncanny events",
        Some(StoryMode::Mystery) => {
            "A puzzling case, hidden truths, a web of tangled relationships"
        }
        Some(StoryMode::Adventure) | None => {
            "Unknown lands, treasure hunting, a world of dangerous challenges"
        }
        Some(StoryMode::Creator) => "A world shaped by the creator's configuration",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_mode_has_four_goals() {
        for mode in [StoryMode::Horror, StoryMode::Adventure, StoryMode::Mystery] {
            assert_eq!(goal_templates(Some(mode)).len(), 4, "{mode}");
        }
        assert_eq!(goal_templates(None), goal_templates(Some(StoryMode::Adventure)));
    }

    #[test]
    fn test_configured_goal_ignores_blank_values() {
        let blank = CustomStoryConfig {
            protagonist_goal: Some("  ".to_owned()),
            ..CustomStoryConfig::default()
        };
        let set = CustomStoryConfig {
            protagonist_goal: Some("Ring the drowned bell".to_owned()),
            ..CustomStoryConfig::default()
        };

        assert_eq!(configured_goal(None), None);
        assert_eq!(configured_goal(Some(&blank)), None);
        assert_eq!(configured_goal(Some(&set)), Some("Ring the drowned bell"));
    }
}
