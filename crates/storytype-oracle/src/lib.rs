//! Storytype: text oracle adapter.
//!
//! Implements [`storytype_core::oracle::TextOracle`] on top of an
//! OpenAI-compatible `/chat/completions` endpoint and parses the JSON
//! objects the prompts ask for into [`storytype_core::oracle::OracleResponse`].

pub mod chat_completions;
pub mod reply;

pub use chat_completions::{
    ChatCompletionsOracle, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT, OracleSettings,
};
