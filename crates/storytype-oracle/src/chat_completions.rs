//! `TextOracle` backed by an OpenAI-compatible chat completions API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use storytype_core::oracle::{OracleError, OraclePrompt, OracleResponse, PromptKind, TextOracle};
use tracing::{debug, warn};

use crate::reply::parse_reply;

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
/// Default model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for [`ChatCompletionsOracle`].
#[derive(Debug, Clone)]
pub struct OracleSettings {
    /// Bearer token.
    pub api_key: String,
    /// API root, without the trailing `/chat/completions`.
    pub base_url: String,
    /// Model name.
    pub model: String,
    /// Timeout for a single HTTP request.
    pub request_timeout: Duration,
}

impl OracleSettings {
    /// Settings with the default endpoint, model and timeout.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
            request_timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Sampling temperature and token budget per kind of text.
fn sampling(kind: PromptKind) -> (f32, u32) {
    match kind {
        PromptKind::Question => (0.6, 350),
        PromptKind::Scene => (0.8, 1000),
        PromptKind::Ending => (0.7, 1200),
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Text oracle calling `{base_url}/chat/completions`.
#[derive(Debug, Clone)]
pub struct ChatCompletionsOracle {
    client: Client,
    settings: OracleSettings,
}

impl ChatCompletionsOracle {
    /// Builds the HTTP client.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::Unavailable` if the client cannot be built.
    pub fn new(settings: OracleSettings) -> Result<Self, OracleError> {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| OracleError::Unavailable(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, settings })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.settings.base_url.trim_end_matches('/'))
    }

    async fn complete(&self, prompt: &OraclePrompt) -> Result<String, OracleError> {
        let (temperature, max_tokens) = sampling(prompt.kind);
        let request = ChatCompletionRequest {
            model: &self.settings.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.body,
                },
            ],
            temperature,
            max_tokens,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.settings.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OracleError::Timeout(self.settings.request_timeout)
                } else {
                    OracleError::Unavailable(format!("request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_http_error(status, &body));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| OracleError::Malformed(format!("unreadable completion body: {e}")))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| OracleError::Malformed("completion has no content".to_owned()))
    }
}

fn map_http_error(status: StatusCode, body: &str) -> OracleError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.pointer("/error/message")?.as_str().map(str::to_owned))
        .unwrap_or_else(|| body.chars().take(200).collect());
    OracleError::Unavailable(format!("HTTP {}: {message}", status.as_u16()))
}

#[async_trait]
impl TextOracle for ChatCompletionsOracle {
    async fn generate(&self, prompt: &OraclePrompt) -> Result<OracleResponse, OracleError> {
        if self.settings.api_key.trim().is_empty() {
            return Err(OracleError::Unavailable("no API key configured".to_owned()));
        }

        let content = self.complete(prompt).await.inspect_err(|e| {
            warn!(kind = ?prompt.kind, error = %e, "chat completion failed");
        })?;
        debug!(kind = ?prompt.kind, reply_chars = content.len(), "chat completion received");
        parse_reply(prompt.kind, &content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Json;
    use axum::Router;
    use axum::http::StatusCode as AxumStatus;
    use axum::routing::post;
    use storytype_core::axis::Axis;

    fn prompt(kind: PromptKind) -> OraclePrompt {
        OraclePrompt {
            kind,
            dimension: Some(Axis::TF),
            system: "system".to_owned(),
            body: "body".to_owned(),
        }
    }

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/v1")
    }

    fn settings(base_url: String) -> OracleSettings {
        OracleSettings {
            base_url,
            ..OracleSettings::new("test-key")
        }
    }

    #[tokio::test]
    async fn test_missing_api_key_is_unavailable() {
        let oracle = ChatCompletionsOracle::new(OracleSettings::new("")).unwrap();

        let result = oracle.generate(&prompt(PromptKind::Question)).await;

        assert!(matches!(result, Err(OracleError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_completion_content_is_parsed() {
        // Arrange
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|Json(request): Json<serde_json::Value>| async move {
                assert_eq!(request["model"], DEFAULT_MODEL);
                assert_eq!(request["max_tokens"], 350);
                assert_eq!(request["messages"][1]["content"], "body");
                Json(serde_json::json!({
                    "choices": [{
                        "message": {
                            "content": "```json\n{\"question\":\"Q\",\"optionA\":\"A\",\"optionB\":\"B\",\"dimension\":\"TF\"}\n```"
                        }
                    }]
                }))
            }),
        );
        let oracle = ChatCompletionsOracle::new(settings(serve(router).await)).unwrap();

        // Act
        let response = oracle.generate(&prompt(PromptKind::Question)).await.unwrap();

        // Assert
        assert_eq!(response.main_text, "Q");
        assert_eq!(response.dimension_tag.as_deref(), Some("TF"));
    }

    #[tokio::test]
    async fn test_http_error_is_unavailable_with_api_message() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async {
                (
                    AxumStatus::TOO_MANY_REQUESTS,
                    Json(serde_json::json!({ "error": { "message": "rate limited" } })),
                )
            }),
        );
        let oracle = ChatCompletionsOracle::new(settings(serve(router).await)).unwrap();

        let result = oracle.generate(&prompt(PromptKind::Scene)).await;

        match result.unwrap_err() {
            OracleError::Unavailable(message) => {
                assert!(message.contains("429"));
                assert!(message.contains("rate limited"));
            }
            other => panic!("expected Unavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_choices_are_malformed() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { Json(serde_json::json!({ "choices": [] })) }),
        );
        let oracle = ChatCompletionsOracle::new(settings(serve(router).await)).unwrap();

        let result = oracle.generate(&prompt(PromptKind::Ending)).await;

        assert!(matches!(result, Err(OracleError::Malformed(_))));
    }
}
