//! Text oracle abstraction.
//!
//! The oracle turns a prompt into question, scene or ending prose. It is a
//! black box to the engines: they only consume [`OracleResponse`] or an
//! [`OracleError`], and every call site has a deterministic fallback.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::axis::Axis;

/// What the oracle is asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
    /// A fixed-turn question with two options.
    Question,
    /// A game-master scene with two choices.
    Scene,
    /// A game-master ending.
    Ending,
}

/// Input handed to the oracle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OraclePrompt {
    /// What kind of text is requested.
    pub kind: PromptKind,
    /// The axis the generated choice must probe, if any.
    pub dimension: Option<Axis>,
    /// Role/system instruction.
    pub system: String,
    /// Rendered prompt body.
    pub body: String,
}

/// Keys of [`AuxiliaryUpdates::notes`] understood by the engines.
pub mod note_keys {
    /// Progress impact of choice A, as a decimal integer.
    pub const IMPACT_A: &str = "progress_impact_a";
    /// Progress impact of choice B, as a decimal integer.
    pub const IMPACT_B: &str = "progress_impact_b";
    /// Ending: reading of the choices made.
    pub const ANALYSIS: &str = "analysis";
    /// Ending: personality insights.
    pub const INSIGHTS: &str = "personality_insights";
    /// Ending: what was achieved.
    pub const ACHIEVEMENT: &str = "achievement";
}

/// Side effects a scene may carry besides its text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuxiliaryUpdates {
    /// Items to add to the inventory.
    #[serde(default)]
    pub inventory: Vec<String>,
    /// Flags to merge into the narrative flags.
    #[serde(default)]
    pub flags: BTreeMap<String, serde_json::Value>,
    /// Named free-text fields (ending analysis, insights, achievement, ...).
    #[serde(default)]
    pub notes: BTreeMap<String, String>,
}

/// Structured oracle output.
#[derive(Debug, Clone, PartialEq)]
pub struct OracleResponse {
    /// Question, scene or ending text.
    pub main_text: String,
    /// Label of choice A (empty for endings).
    pub choice_a: String,
    /// Label of choice B (empty for endings).
    pub choice_b: String,
    /// Dimension tag as returned by the oracle, unvalidated.
    pub dimension_tag: Option<String>,
    /// Inventory, flag and note updates.
    pub auxiliary: AuxiliaryUpdates,
}

/// Why the oracle could not produce a usable response.
#[derive(Debug, Error)]
pub enum OracleError {
    /// The call did not finish within the allotted time.
    #[error("text oracle timed out after {0:?}")]
    Timeout(Duration),

    /// The oracle answered, but not in the expected shape.
    #[error("malformed oracle response: {0}")]
    Malformed(String),

    /// The oracle could not be reached or is not configured.
    #[error("text oracle unavailable: {0}")]
    Unavailable(String),
}

/// The external text-generation collaborator.
#[async_trait]
pub trait TextOracle: Send + Sync {
    /// Generate text for `prompt`.
    async fn generate(&self, prompt: &OraclePrompt) -> Result<OracleResponse, OracleError>;
}

/// Calls `oracle` with a bounded timeout.
///
/// # Errors
///
/// Returns `OracleError::Timeout` when `limit` elapses, or whatever the oracle
/// itself returned.
pub async fn consult(
    oracle: &dyn TextOracle,
    prompt: &OraclePrompt,
    limit: Duration,
) -> Result<OracleResponse, OracleError> {
    match tokio::time::timeout(limit, oracle.generate(prompt)).await {
        Ok(result) => result,
        Err(_) => Err(OracleError::Timeout(limit)),
    }
}

/// Oracle used when no credentials are configured. Always unavailable, so
/// every caller takes its fallback path.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledOracle;

#[async_trait]
impl TextOracle for DisabledOracle {
    async fn generate(&self, _prompt: &OraclePrompt) -> Result<OracleResponse, OracleError> {
        Err(OracleError::Unavailable("no oracle credentials configured".to_owned()))
    }
}
