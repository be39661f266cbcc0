//! Suggestion backends: turn a diff into a commit message or branch name.

pub mod claude;
pub mod openai;
pub mod prompt;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{BackendError, ConfigError};

pub use claude::ClaudeCliBackend;
pub use openai::OpenAiBackend;
pub use prompt::build_prompt;

/// What the model is asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    CommitMessage,
    BranchName,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::CommitMessage => "commit message",
            TaskKind::BranchName => "branch name",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supported backend providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provider {
    #[default]
    OpenAi,
    ClaudeCli,
}

impl Provider {
    /// Human-readable label used in messages. Not accepted by [`FromStr`];
    /// see [`Provider::id`] for the configuration value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "OpenAI",
            Provider::ClaudeCli => "Claude CLI",
        }
    }

    /// Identifier accepted in `AI_PROVIDER`, settings files and `--provider`.
    pub fn id(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::ClaudeCli => "claude-cli",
        }
    }

    /// Whether this provider needs `AI_API_KEY`.
    pub fn requires_api_key(&self) -> bool {
        matches!(self, Provider::OpenAi)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "claude-cli" | "claude" => Ok(Provider::ClaudeCli),
            _ => Err(ConfigError::InvalidProvider(s.to_string())),
        }
    }
}

/// Backend settings fixed at startup.
#[derive(Clone)]
pub struct BackendConfig {
    pub api_key: Option<String>,
    /// Model override; `None` uses the provider's default.
    pub model: Option<String>,
    /// API root for HTTP providers; `None` uses the provider's default.
    pub base_url: Option<String>,
    pub timeout: Duration,
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Text generation capability consulted by the [`Suggester`](crate::suggest::Suggester).
///
/// Implementations must reject an empty diff with [`BackendError::EmptyInput`]
/// before contacting anything external.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SuggestionBackend: Send + Sync {
    fn provider(&self) -> Provider;

    /// Generate text for `task` from `diff`.
    ///
    /// Returns the first candidate, whitespace-trimmed. The output is not
    /// checked against the requested format.
    async fn generate(&self, diff: &str, task: TaskKind) -> Result<String, BackendError>;
}

/// Construct the backend for `provider`.
pub fn build_backend(
    provider: Provider,
    config: &BackendConfig,
) -> Result<Box<dyn SuggestionBackend>, ConfigError> {
    match provider {
        Provider::OpenAi => {
            let api_key = config
                .api_key
                .clone()
                .filter(|k| !k.is_empty())
                .ok_or(ConfigError::MissingApiKey)?;
            Ok(Box::new(OpenAiBackend::new(api_key, config)))
        }
        Provider::ClaudeCli => Ok(Box::new(ClaudeCliBackend::new(config))),
    }
}

/// Shared precondition for every backend.
pub(crate) fn ensure_diff(diff: &str) -> Result<(), BackendError> {
    if diff.is_empty() {
        return Err(BackendError::EmptyInput);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_key: Option<&str>) -> BackendConfig {
        BackendConfig {
            api_key: api_key.map(str::to_string),
            model: None,
            base_url: None,
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("openai".parse::<Provider>().unwrap(), Provider::OpenAi);
        assert_eq!("OpenAI".parse::<Provider>().unwrap(), Provider::OpenAi);
        assert_eq!("claude-cli".parse::<Provider>().unwrap(), Provider::ClaudeCli);
        assert!(matches!(
            "gemini".parse::<Provider>(),
            Err(ConfigError::InvalidProvider(p)) if p == "gemini"
        ));
    }

    #[test]
    fn test_provider_id_round_trips_through_from_str() {
        for provider in [Provider::OpenAi, Provider::ClaudeCli] {
            assert_eq!(provider.id().parse::<Provider>().unwrap(), provider);
        }
        assert_eq!(Provider::OpenAi.to_string(), "OpenAI");
        assert!(Provider::ClaudeCli.to_string().parse::<Provider>().is_err());
    }

    #[test]
    fn test_default_provider_is_openai() {
        assert_eq!(Provider::default(), Provider::OpenAi);
        assert!(Provider::OpenAi.requires_api_key());
        assert!(!Provider::ClaudeCli.requires_api_key());
    }

    #[test]
    fn test_task_kind_display() {
        assert_eq!(TaskKind::CommitMessage.to_string(), "commit message");
        assert_eq!(TaskKind::BranchName.to_string(), "branch name");
    }

    #[test]
    fn test_build_backend_openai_requires_key() {
        assert!(matches!(
            build_backend(Provider::OpenAi, &config(None)),
            Err(ConfigError::MissingApiKey)
        ));
        assert!(matches!(
            build_backend(Provider::OpenAi, &config(Some(""))),
            Err(ConfigError::MissingApiKey)
        ));
    }

    #[test]
    fn test_build_backend_selects_provider() {
        let backend = build_backend(Provider::OpenAi, &config(Some("sk-test"))).unwrap();
        assert_eq!(backend.provider(), Provider::OpenAi);

        let backend = build_backend(Provider::ClaudeCli, &config(None)).unwrap();
        assert_eq!(backend.provider(), Provider::ClaudeCli);
    }

    #[test]
    fn test_backend_config_debug_redacts_key() {
        let rendered = format!("{:?}", config(Some("sk-secret-value")));
        assert!(!rendered.contains("sk-secret-value"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_ensure_diff_rejects_empty() {
        assert!(matches!(ensure_diff(""), Err(BackendError::EmptyInput)));
        assert!(ensure_diff("+x").is_ok());
    }
}
