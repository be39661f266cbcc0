//! Error types for lazy-git modules using thiserror.

use std::fmt;

use thiserror::Error;

use crate::llm::{Provider, TaskKind};

/// Classification of every failure the pipeline can surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotARepository,
    NoStagedChanges,
    NoChanges,
    DiffUnavailable,
    EmptyInput,
    BackendUnavailable,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotARepository => "not a repository",
            ErrorKind::NoStagedChanges => "no staged changes",
            ErrorKind::NoChanges => "no changes",
            ErrorKind::DiffUnavailable => "diff unavailable",
            ErrorKind::EmptyInput => "empty input",
            ErrorKind::BackendUnavailable => "backend unavailable",
        }
    }

    /// Whether the user can fix this locally (stage files, change directory).
    ///
    /// `DiffUnavailable` and `BackendUnavailable` depend on external tools or
    /// services; `EmptyInput` indicates a bug in the caller.
    pub fn is_user_fixable(&self) -> bool {
        matches!(
            self,
            ErrorKind::NotARepository | ErrorKind::NoStagedChanges | ErrorKind::NoChanges
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from git CLI operations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Failed to spawn git: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("git {command} exited with code {code}: {stderr}")]
    NonZeroExit {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("git {command} timed out after {secs} seconds")]
    Timeout { command: String, secs: u64 },
}

/// Errors from suggestion backends.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("diff is empty, nothing to send to the model")]
    EmptyInput,

    #[error("{provider} request failed: {reason}")]
    Request { provider: Provider, reason: String },

    #[error("{provider} API returned HTTP {status}: {message}")]
    Status {
        provider: Provider,
        status: u16,
        message: String,
    },

    #[error("{provider} returned no candidates")]
    NoCandidates { provider: Provider },

    #[error("{provider} returned a malformed response: {detail}")]
    InvalidResponse { provider: Provider, detail: String },

    #[error("Claude Code CLI not found. Install with: npm install -g @anthropic-ai/claude-code")]
    NotInstalled,

    #[error("Failed to spawn Claude process: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("Claude CLI exited with code {code}: {stderr}")]
    NonZeroExit { code: i32, stderr: String },

    #[error("{provider} timed out after {secs} seconds")]
    Timeout { provider: Provider, secs: u64 },
}

impl BackendError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BackendError::EmptyInput => ErrorKind::EmptyInput,
            _ => ErrorKind::BackendUnavailable,
        }
    }
}

/// Errors from configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("AI_API_KEY is required (set it in the environment, .env, or the settings file)")]
    MissingApiKey,

    #[error("Unknown AI provider '{0}' (expected 'openai' or 'claude-cli')")]
    InvalidProvider(String),

    #[error("Failed to read settings file {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings file {path}: {source}")]
    ParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Which diff the orchestrator was fetching when git failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffKind {
    Staged,
    Working,
}

impl fmt::Display for DiffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffKind::Staged => f.write_str("staged"),
            DiffKind::Working => f.write_str("working"),
        }
    }
}

/// Pipeline stage an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Precondition,
    DiffAcquisition,
    Generation,
}

/// Errors from the suggestion pipeline.
#[derive(Error, Debug)]
pub enum SuggestError {
    #[error("not a git repository")]
    NotARepository,

    #[error("no staged changes found. Use 'git add' to stage changes")]
    NoStagedChanges,

    #[error("no changes found")]
    NoChanges,

    #[error("failed to get {which} changes: {source}")]
    Diff {
        which: DiffKind,
        #[source]
        source: GitError,
    },

    #[error("failed to generate {task}: {source}")]
    Generation {
        task: TaskKind,
        #[source]
        source: BackendError,
    },
}

impl SuggestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SuggestError::NotARepository => ErrorKind::NotARepository,
            SuggestError::NoStagedChanges => ErrorKind::NoStagedChanges,
            SuggestError::NoChanges => ErrorKind::NoChanges,
            SuggestError::Diff { .. } => ErrorKind::DiffUnavailable,
            SuggestError::Generation { source, .. } => source.kind(),
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            SuggestError::NotARepository => Stage::Precondition,
            SuggestError::NoStagedChanges | SuggestError::NoChanges | SuggestError::Diff { .. } => {
                Stage::DiffAcquisition
            }
            SuggestError::Generation { .. } => Stage::Generation,
        }
    }
}
