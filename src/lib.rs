//! lazy-git - A CLI tool that suggests commit messages and branch names from your git changes.
//!
//! # Overview
//!
//! lazy-git reads the staged (or, for branch names, unstaged) diff of the
//! current repository with the git CLI, asks a language model backend to
//! summarize it, and prints the suggestion.

pub mod config;
pub mod error;
pub mod git;
pub mod llm;
pub mod suggest;

// Re-export commonly used types
pub use config::{Config, Overrides};
pub use error::{BackendError, ConfigError, ErrorKind, GitError, Stage, SuggestError};
pub use git::{DiffResult, DiffSource, GitCli};
pub use llm::{BackendConfig, Provider, SuggestionBackend, TaskKind, build_backend};
pub use suggest::Suggester;
