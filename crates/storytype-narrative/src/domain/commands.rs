//! Commands for the Narrative Phase Orchestration context.

use storytype_core::command::Command;
use uuid::Uuid;

/// Command to fetch the question at the session's current index, generating
/// one when none is pending.
#[derive(Debug, Clone)]
pub struct RequestNextQuestion {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session identifier.
    pub session_id: String,
}

impl Command for RequestNextQuestion {
    fn command_type(&self) -> &'static str {
        "narrative.request_next_question"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn session_id(&self) -> &str {
        &self.session_id
    }
}
