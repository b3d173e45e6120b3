//! Story settings used to flavor generated questions and scenes.

use storytype_core::axis::Axis;
use storytype_session::domain::story::{CustomStoryConfig, StoryMode};

/// Choice guidance shared by creator-mode stories.
const CREATOR_GUIDANCE: [&str; 4] = [
    "cooperate with others vs think and act alone",
    "trust concrete facts vs trust possibilities and instinct",
    "put logic and efficiency first vs put feelings and harmony first",
    "stick to the plan vs adapt as things change",
];

/// Genre, tone and per-axis choice guidance for one story.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorySetting {
    /// Genre label.
    pub atmosphere: String,
    /// Opening situation.
    pub opening: String,
    /// Desired tone.
    pub tone: String,
    /// Era.
    pub time_period: String,
    /// What holds in this world.
    pub world_rules: String,
    /// Recurring story elements.
    pub key_elements: String,
    /// Who the protagonist is.
    pub protagonist: String,
    /// What the protagonist is after, for creator stories.
    pub protagonist_goal: Option<String>,
    guidance: [String; 4],
}

fn owned(items: [&str; 4]) -> [String; 4] {
    items.map(str::to_owned)
}

impl StorySetting {
    /// The setting for `story_mode`; stories without a mode read as adventure.
    #[must_use]
    pub fn for_story(story_mode: Option<StoryMode>, custom: Option<&CustomStoryConfig>) -> Self {
        match story_mode.unwrap_or(StoryMode::Adventure) {
            StoryMode::Horror => Self::horror(),
            StoryMode::Adventure => Self::adventure(),
            StoryMode::Mystery => Self::mystery(),
            StoryMode::Creator => Self::creator(custom),
        }
    }

    /// How the two options of a question on `axis` should differ.
    #[must_use]
    pub fn choice_guidance(&self, axis: Axis) -> &str {
        &self.guidance[axis.index()]
    }

    fn horror() -> Self {
        Self {
            atmosphere: "Horror thriller".to_owned(),
            opening: "Stepping into an eerie old mansion, the door slams shut behind.".to_owned(),
            tone: "Tension and dread".to_owned(),
            time_period: "Present day".to_owned(),
            world_rules: "Supernatural forces are at work".to_owned(),
            key_elements: "Strange sounds, shadows, cryptic messages, a pursuer".to_owned(),
            protagonist: "Someone caught up in the incident".to_owned(),
            protagonist_goal: None,
            guidance: owned([
                "work with others vs act alone",
                "deal with the visible danger vs sense the unseen threat",
                "escape logically vs put companions' safety first",
                "act to a plan vs improvise",
            ]),
        }
    }

    fn adventure() -> Self {
        Self {
            atmosphere: "Adventure".to_owned(),
            opening: "At the entrance to ancient ruins, where a legendary treasure is said to sleep."
                .to_owned(),
            tone: "Exciting and adventurous".to_owned(),
            time_period: "Fantasy age".to_owned(),
            world_rules: "Courage and wit are rewarded".to_owned(),
            key_elements: "An ancient map, traps, companions, the legendary treasure".to_owned(),
            protagonist: "An adventurer and explorer".to_owned(),
            protagonist_goal: None,
            guidance: owned([
                "take on the challenge as a team vs adventure alone",
                "rely on the map and evidence vs trust intuition",
                "choose the optimal strategy vs respect companions' views",
                "plan carefully vs adapt on the spot",
            ]),
        }
    }

    fn mystery() -> Self {
        Self {
            atmosphere: "Mystery".to_owned(),
            opening: "A crime in a locked room. Every suspect is in this room.".to_owned(),
            tone: "Deduction and analysis".to_owned(),
            time_period: "Present day".to_owned(),
            world_rules: "Every mystery has a logical answer".to_owned(),
            key_elements: "Contradicting testimony, hidden motives, alibis".to_owned(),
            protagonist: "A detective involved in the case".to_owned(),
            protagonist_goal: None,
            guidance: owned([
                "gather information from several people vs analyze evidence alone",
                "weigh physical evidence vs reason from motives",
                "name the culprit by logic vs read lies from emotion",
                "investigate systematically vs follow hunches",
            ]),
        }
    }

    fn creator(custom: Option<&CustomStoryConfig>) -> Self {
        let Some(custom) = custom else {
            return Self {
                atmosphere: "Dramatic".to_owned(),
                opening: "The story begins.".to_owned(),
                tone: "Adventurous".to_owned(),
                time_period: "Unknown".to_owned(),
                world_rules: "The protagonist's choices move the story".to_owned(),
                key_elements: "An important item".to_owned(),
                protagonist: "The protagonist".to_owned(),
                protagonist_goal: None,
                guidance: owned(CREATOR_GUIDANCE),
            };
        };

        let (atmosphere, tone) = match custom.mood.as_deref() {
            Some("mysterious") => ("Mysterious", "An enigmatic air"),
            Some("adventure") => ("Adventure", "Stirs the spirit of adventure"),
            Some("romantic") => ("Romantic", "Heartwarming and moving"),
            Some("thriller") => ("Thriller", "Tense developments"),
            Some("comedy") => ("Comedy", "Light and fun"),
            Some("dramatic") => ("Dramatic", "Sharp emotional swings"),
            _ => ("Dramatic", "Adventurous"),
        };
        let time_period = match custom.time_period.as_deref() {
            Some("modern") => "Present day",
            Some("near_future") => "Near future",
            Some("far_future") => "Far future",
            Some("fantasy") => "Fantasy",
            Some("medieval") => "Medieval",
            Some("historical") => "Historical",
            _ => "Unknown",
        };
        let setting = custom.setting.as_deref().unwrap_or("An unknown place");
        let theme = custom.theme.as_deref().unwrap_or("an uncertain mission");

        Self {
            atmosphere: atmosphere.to_owned(),
            opening: format!("The story begins in {setting}, with a mission: {theme}."),
            tone: tone.to_owned(),
            time_period: time_period.to_owned(),
            world_rules: theme.to_owned(),
            key_elements: custom
                .key_items
                .clone()
                .unwrap_or_else(|| "An important item".to_owned()),
            protagonist: custom
                .character_background
                .clone()
                .unwrap_or_else(|| "The protagonist".to_owned()),
            protagonist_goal: custom.protagonist_goal.clone(),
            guidance: owned(CREATOR_GUIDANCE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_story_mode_reads_as_adventure() {
        assert_eq!(
            StorySetting::for_story(None, None),
            StorySetting::for_story(Some(StoryMode::Adventure), None)
        );
    }

    #[test]
    fn test_guidance_is_per_axis() {
        let setting = StorySetting::for_story(Some(StoryMode::Mystery), None);

        assert!(setting.choice_guidance(Axis::SN).contains("physical evidence"));
        assert!(setting.choice_guidance(Axis::JP).contains("hunches"));
    }

    #[test]
    fn test_creator_setting_uses_custom_fields() {
        let custom = CustomStoryConfig {
            setting: Some("a drowned cathedral".to_owned()),
            theme: Some("recover the bell".to_owned()),
            mood: Some("thriller".to_owned()),
            time_period: Some("near_future".to_owned()),
            protagonist_goal: Some("go home".to_owned()),
            ..CustomStoryConfig::default()
        };

        let setting = StorySetting::for_story(Some(StoryMode::Creator), Some(&custom));

        assert_eq!(setting.atmosphere, "Thriller");
        assert_eq!(setting.time_period, "Near future");
        assert!(setting.opening.contains("a drowned cathedral"));
        assert_eq!(setting.world_rules, "recover the bell");
        assert_eq!(setting.protagonist_goal.as_deref(), Some("go home"));
    }

    #[test]
    fn test_creator_without_config_uses_defaults() {
        let setting = StorySetting::for_story(Some(StoryMode::Creator), None);

        assert_eq!(setting.atmosphere, "Dramatic");
        assert_eq!(setting.protagonist, "The protagonist");
    }
}
