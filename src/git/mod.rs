//! Diff source: staged and unstaged changes from the git CLI.

pub mod cli;
pub mod diff;

use async_trait::async_trait;

use crate::error::GitError;

pub use cli::GitCli;
pub use diff::{DiffResult, FILE_HEADER_MARKER, count_files};

/// Read-only view of a working copy's pending changes.
///
/// This abstraction allows swapping the git subprocess for canned diffs in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DiffSource: Send + Sync {
    /// Whether the working directory is inside a git working copy.
    ///
    /// Detection failures are reported as `false`.
    async fn is_repository(&self) -> bool;

    /// Changes staged for commit (index vs HEAD).
    async fn staged_diff(&self) -> Result<DiffResult, GitError>;

    /// Unstaged changes (working tree vs index).
    async fn working_diff(&self) -> Result<DiffResult, GitError>;
}
