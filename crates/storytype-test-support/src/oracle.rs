//! Test oracles: scripted `TextOracle` implementations for tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use storytype_core::oracle::{
    AuxiliaryUpdates, OracleError, OraclePrompt, OracleResponse, TextOracle,
};

/// Builds a plain oracle response with no auxiliary updates.
#[must_use]
pub fn canned_response(
    main_text: &str,
    choice_a: &str,
    choice_b: &str,
    dimension_tag: Option<&str>,
) -> OracleResponse {
    OracleResponse {
        main_text: main_text.to_owned(),
        choice_a: choice_a.to_owned(),
        choice_b: choice_b.to_owned(),
        dimension_tag: dimension_tag.map(str::to_owned),
        auxiliary: AuxiliaryUpdates::default(),
    }
}

/// An oracle that replays a script of results in order and records every
/// prompt it receives. Once the script is exhausted every call is
/// `Unavailable`.
#[derive(Debug, Default)]
pub struct ScriptedOracle {
    script: Mutex<VecDeque<Result<OracleResponse, OracleError>>>,
    prompts: Mutex<Vec<OraclePrompt>>,
}

impl ScriptedOracle {
    /// Create an oracle that returns `script` one entry per call.
    #[must_use]
    pub fn new(script: Vec<Result<OracleResponse, OracleError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Create an oracle that answers once with `response`.
    #[must_use]
    pub fn replying(response: OracleResponse) -> Self {
        Self::new(vec![Ok(response)])
    }

    /// Returns a snapshot of every prompt received.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn prompts(&self) -> Vec<OraclePrompt> {
        self.prompts.lock().unwrap().clone()
    }

    /// Number of calls received.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl TextOracle for ScriptedOracle {
    async fn generate(&self, prompt: &OraclePrompt) -> Result<OracleResponse, OracleError> {
        self.prompts.lock().unwrap().push(prompt.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(OracleError::Unavailable("script exhausted".into())))
    }
}

/// An oracle that always answers with an unusable body.
#[derive(Debug)]
pub struct FailingOracle;

#[async_trait]
impl TextOracle for FailingOracle {
    async fn generate(&self, _prompt: &OraclePrompt) -> Result<OracleResponse, OracleError> {
        Err(OracleError::Malformed("no JSON object in reply".into()))
    }
}

/// An oracle that sleeps for the given duration before failing. Used to
/// exercise call-site timeouts.
#[derive(Debug)]
pub struct StallingOracle(pub Duration);

#[async_trait]
impl TextOracle for StallingOracle {
    async fn generate(&self, _prompt: &OraclePrompt) -> Result<OracleResponse, OracleError> {
        tokio::time::sleep(self.0).await;
        Err(OracleError::Unavailable("stalled".into()))
    }
}
