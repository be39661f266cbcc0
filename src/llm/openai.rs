//! OpenAI-compatible chat-completions backend.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::BackendError;

use super::prompt::build_prompt;
use super::{BackendConfig, Provider, SuggestionBackend, TaskKind, ensure_diff};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    #[serde(default)]
    content: Option<String>,
}

/// Error envelope returned by the API on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Backend that calls `POST {base_url}/chat/completions`.
pub struct OpenAiBackend {
    client: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
    timeout: Duration,
}

impl OpenAiBackend {
    pub fn new(api_key: impl Into<String>, config: &BackendConfig) -> Self {
        let base_url = config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: config
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            timeout: config.timeout,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request_error(&self, err: reqwest::Error) -> BackendError {
        if err.is_timeout() {
            BackendError::Timeout {
                provider: Provider::OpenAi,
                secs: self.timeout.as_secs(),
            }
        } else {
            BackendError::Request {
                provider: Provider::OpenAi,
                reason: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl SuggestionBackend for OpenAiBackend {
    fn provider(&self) -> Provider {
        Provider::OpenAi
    }

    async fn generate(&self, diff: &str, task: TaskKind) -> Result<String, BackendError> {
        ensure_diff(diff)?;

        let prompt = build_prompt(diff, task);
        debug!(model = %self.model, %task, prompt_len = prompt.len(), "requesting completion");

        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: &prompt,
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.request_error(e))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| body.trim().to_string());
            return Err(BackendError::Status {
                provider: Provider::OpenAi,
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|e| BackendError::InvalidResponse {
                provider: Provider::OpenAi,
                detail: e.to_string(),
            })?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or(BackendError::NoCandidates {
                provider: Provider::OpenAi,
            })?;

        // Refusals and tool-call replies carry a null or blank content.
        let text = choice
            .message
            .content
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(BackendError::NoCandidates {
                provider: Provider::OpenAi,
            })?;
        debug!(response_len = text.len(), "received completion");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(model: Option<&str>, base_url: Option<&str>) -> BackendConfig {
        BackendConfig {
            api_key: Some("sk-test".to_string()),
            model: model.map(str::to_string),
            base_url: base_url.map(str::to_string),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_defaults_when_not_configured() {
        let backend = OpenAiBackend::new("sk-test", &config(None, None));
        assert_eq!(backend.model(), DEFAULT_MODEL);
        assert_eq!(backend.endpoint(), "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn test_overrides_model_and_trims_base_url_slash() {
        let backend = OpenAiBackend::new(
            "sk-test",
            &config(Some("gpt-4.1"), Some("http://localhost:8080/v1/")),
        );
        assert_eq!(backend.model(), "gpt-4.1");
        assert_eq!(backend.endpoint(), "http://localhost:8080/v1/chat/completions");
    }

    #[tokio::test]
    async fn test_empty_diff_fails_without_request() {
        // Unroutable endpoint: any request attempt would surface as Request, not EmptyInput.
        let backend = OpenAiBackend::new("sk-test", &config(None, Some("http://127.0.0.1:9")));
        let result = backend.generate("", TaskKind::CommitMessage).await;
        assert!(matches!(result, Err(BackendError::EmptyInput)));
    }

    #[test]
    fn test_request_serializes_single_user_message() {
        let request = ChatRequest {
            model: "gpt-4o-mini",
            messages: [ChatMessage {
                role: "user",
                content: "hi",
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hi");
    }

    #[test]
    fn test_response_without_choices_deserializes_empty() {
        let parsed: ChatResponse = serde_json::from_str(r#"{"id": "x"}"#).unwrap();
        assert!(parsed.choices.is_empty());
    }
}
