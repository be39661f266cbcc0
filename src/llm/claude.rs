//! Claude Code CLI backend.
//!
//! Runs `claude -p <prompt> --output-format json` and reads the `result`
//! field of the JSON envelope.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::error::BackendError;

use super::prompt::build_prompt;
use super::{BackendConfig, Provider, SuggestionBackend, TaskKind, ensure_diff};

/// Trait for executing Claude CLI commands.
///
/// This abstraction allows mocking the Claude subprocess in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClaudeRunner: Send + Sync {
    /// Run `claude` with `args` and return its stdout.
    async fn run(&self, args: Vec<String>) -> Result<String, BackendError>;
}

/// Runner that spawns the real `claude` binary.
pub struct CliRunner {
    timeout: Duration,
}

impl CliRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl ClaudeRunner for CliRunner {
    async fn run(&self, args: Vec<String>) -> Result<String, BackendError> {
        if which::which("claude").is_err() {
            return Err(BackendError::NotInstalled);
        }

        let mut cmd = Command::new("claude");
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| BackendError::Timeout {
                provider: Provider::ClaudeCli,
                secs: self.timeout.as_secs(),
            })?
            .map_err(BackendError::SpawnFailed)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let code = output.status.code().unwrap_or(-1);
            return Err(BackendError::NonZeroExit { code, stderr });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

/// Claude CLI JSON envelope when using --output-format json
#[derive(Debug, Deserialize)]
struct ClaudeCliResponse {
    #[serde(default)]
    result: String,
    #[serde(default)]
    is_error: bool,
}

/// Backend that delegates to a locally installed Claude Code CLI.
pub struct ClaudeCliBackend<R: ClaudeRunner = CliRunner> {
    runner: R,
    model: Option<String>,
}

impl ClaudeCliBackend<CliRunner> {
    pub fn new(config: &BackendConfig) -> Self {
        Self::with_runner(CliRunner::new(config.timeout), config.model.clone())
    }
}

impl<R: ClaudeRunner> ClaudeCliBackend<R> {
    pub fn with_runner(runner: R, model: Option<String>) -> Self {
        Self { runner, model }
    }

    fn args(&self, prompt: String) -> Vec<String> {
        let mut args = vec![
            "-p".to_string(),
            prompt,
            "--output-format".to_string(),
            "json".to_string(),
        ];
        if let Some(model) = &self.model {
            args.push("--model".to_string());
            args.push(model.clone());
        }
        args
    }
}

#[async_trait]
impl<R: ClaudeRunner> SuggestionBackend for ClaudeCliBackend<R> {
    fn provider(&self) -> Provider {
        Provider::ClaudeCli
    }

    async fn generate(&self, diff: &str, task: TaskKind) -> Result<String, BackendError> {
        ensure_diff(diff)?;

        let prompt = build_prompt(diff, task);
        debug!(model = ?self.model, %task, prompt_len = prompt.len(), "running claude");

        let stdout = self.runner.run(self.args(prompt)).await?;
        parse_claude_response(&stdout)
    }
}

/// Extract the generated text from Claude's JSON envelope.
fn parse_claude_response(response: &str) -> Result<String, BackendError> {
    let envelope: ClaudeCliResponse =
        serde_json::from_str(response).map_err(|e| BackendError::InvalidResponse {
            provider: Provider::ClaudeCli,
            detail: e.to_string(),
        })?;

    if envelope.is_error {
        return Err(BackendError::Request {
            provider: Provider::ClaudeCli,
            reason: envelope.result,
        });
    }

    let text = envelope.result.trim();
    if text.is_empty() {
        return Err(BackendError::NoCandidates {
            provider: Provider::ClaudeCli,
        });
    }

    Ok(text.to_string())
}
