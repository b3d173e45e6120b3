//! Commands for the Session & Progress context.

use storytype_core::command::Command;
use storytype_core::record::Side;
use uuid::Uuid;

use super::story::{CustomStoryConfig, ModeKind, StoryMode};

/// Command to load a session, creating it when absent.
#[derive(Debug, Clone)]
pub struct FindOrCreateSession {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session identifier.
    pub session_id: String,
}

impl Command for FindOrCreateSession {
    fn command_type(&self) -> &'static str {
        "session.find_or_create"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn session_id(&self) -> &str {
        &self.session_id
    }
}

/// Command to answer the question at the current index.
#[derive(Debug, Clone)]
pub struct SubmitAnswer {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session identifier.
    pub session_id: String,
    /// The chosen side.
    pub choice: Side,
}

impl Command for SubmitAnswer {
    fn command_type(&self) -> &'static str {
        "session.submit_answer"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn session_id(&self) -> &str {
        &self.session_id
    }
}

/// Command to step back one question.
#[derive(Debug, Clone)]
pub struct StepBack {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session identifier.
    pub session_id: String,
}

impl Command for StepBack {
    fn command_type(&self) -> &'static str {
        "session.step_back"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn session_id(&self) -> &str {
        &self.session_id
    }
}

/// Command to finish the run and unlock the result.
#[derive(Debug, Clone)]
pub struct CompleteSession {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session identifier.
    pub session_id: String,
}

impl Command for CompleteSession {
    fn command_type(&self) -> &'static str {
        "session.complete"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn session_id(&self) -> &str {
        &self.session_id
    }
}

/// Command to reopen a completed run.
#[derive(Debug, Clone)]
pub struct ResumeSession {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session identifier.
    pub session_id: String,
}

impl Command for ResumeSession {
    fn command_type(&self) -> &'static str {
        "session.resume"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn session_id(&self) -> &str {
        &self.session_id
    }
}

/// Command to switch between fixed-turn and game-master mode.
#[derive(Debug, Clone)]
pub struct SwitchMode {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session identifier.
    pub session_id: String,
    /// The mode to switch to.
    pub mode: ModeKind,
}

impl Command for SwitchMode {
    fn command_type(&self) -> &'static str {
        "session.switch_mode"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn session_id(&self) -> &str {
        &self.session_id
    }
}

/// Command to pick the story setting.
#[derive(Debug, Clone)]
pub struct ChooseStoryMode {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session identifier.
    pub session_id: String,
    /// The chosen setting.
    pub story_mode: StoryMode,
}

impl Command for ChooseStoryMode {
    fn command_type(&self) -> &'static str {
        "session.choose_story_mode"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn session_id(&self) -> &str {
        &self.session_id
    }
}

/// Command to start a creator-mode story from user configuration.
#[derive(Debug, Clone)]
pub struct ConfigureCustomStory {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session identifier.
    pub session_id: String,
    /// The user's story configuration.
    pub config: CustomStoryConfig,
}

impl Command for ConfigureCustomStory {
    fn command_type(&self) -> &'static str {
        "session.configure_custom_story"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn session_id(&self) -> &str {
        &self.session_id
    }
}
