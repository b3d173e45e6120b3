//! Commands for the Game-Master Narrative context.

use storytype_core::command::Command;
use storytype_core::record::Side;
use uuid::Uuid;

/// Command to produce the scene awaiting a choice.
#[derive(Debug, Clone)]
pub struct GenerateScene {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session identifier.
    pub session_id: String,
}

impl Command for GenerateScene {
    fn command_type(&self) -> &'static str {
        "game_master.generate_scene"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn session_id(&self) -> &str {
        &self.session_id
    }
}

/// Command to answer the current scene.
#[derive(Debug, Clone)]
pub struct RecordChoice {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session identifier.
    pub session_id: String,
    /// The chosen side.
    pub choice: Side,
}

impl Command for RecordChoice {
    fn command_type(&self) -> &'static str {
        "game_master.record_choice"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn session_id(&self) -> &str {
        &self.session_id
    }
}

/// Command to fetch, generating if needed, the story's ending.
#[derive(Debug, Clone)]
pub struct GenerateEnding {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session identifier.
    pub session_id: String,
}

impl Command for GenerateEnding {
    fn command_type(&self) -> &'static str {
        "game_master.generate_ending"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn session_id(&self) -> &str {
        &self.session_id
    }
}
