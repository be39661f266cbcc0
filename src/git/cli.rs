//! Git CLI spawning.
//!
//! All queries shell out to the system `git` binary so the user's own git
//! config (attributes, textconv, safe.directory) applies.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::error::GitError;

use super::DiffSource;
use super::diff::DiffResult;

const STAGED_DIFF_ARGS: &[&str] = &["diff", "--staged", "--no-color", "--no-ext-diff"];
const WORKING_DIFF_ARGS: &[&str] = &["diff", "--no-color", "--no-ext-diff"];
const REPO_CHECK_ARGS: &[&str] = &["rev-parse", "--git-dir"];

/// [`DiffSource`] backed by the `git` executable.
#[derive(Debug, Clone)]
pub struct GitCli {
    work_dir: Option<PathBuf>,
    timeout: Duration,
}

impl GitCli {
    /// Create a git runner.
    ///
    /// Commands run in `work_dir` when given, otherwise in the process's
    /// current directory. Each command is killed after `timeout`.
    pub fn new(work_dir: Option<PathBuf>, timeout: Duration) -> Self {
        Self { work_dir, timeout }
    }

    pub fn work_dir(&self) -> Option<&Path> {
        self.work_dir.as_deref()
    }

    /// Run git with `args` and return its stdout.
    async fn run_git(&self, args: &[&str]) -> Result<String, GitError> {
        let command = args.join(" ");
        debug!(%command, work_dir = ?self.work_dir, "running git");

        let mut cmd = Command::new("git");
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.work_dir {
            cmd.current_dir(dir);
        }

        let output = timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| GitError::Timeout {
                command: command.clone(),
                secs: self.timeout.as_secs(),
            })?
            .map_err(GitError::SpawnFailed)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let code = output.status.code().unwrap_or(-1);
            return Err(GitError::NonZeroExit {
                command,
                code,
                stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    async fn diff(&self, args: &[&str]) -> Result<DiffResult, GitError> {
        let diff = DiffResult::from_content(self.run_git(args).await?);
        debug!(
            bytes = diff.content().len(),
            files = diff.files_changed(),
            "collected diff"
        );
        Ok(diff)
    }
}

#[async_trait]
impl DiffSource for GitCli {
    async fn is_repository(&self) -> bool {
        match self.run_git(REPO_CHECK_ARGS).await {
            Ok(_) => true,
            Err(e) => {
                debug!("repository check failed: {e}");
                false
            }
        }
    }

    async fn staged_diff(&self) -> Result<DiffResult, GitError> {
        self.diff(STAGED_DIFF_ARGS).await
    }

    async fn working_diff(&self) -> Result<DiffResult, GitError> {
        self.diff(WORKING_DIFF_ARGS).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_git_version_succeeds() {
        let git = GitCli::new(None, Duration::from_secs(30));
        let out = git.run_git(&["--version"]).await.unwrap();
        assert!(out.starts_with("git version"));
    }

    #[tokio::test]
    async fn test_run_git_invalid_command_carries_stderr() {
        let git = GitCli::new(None, Duration::from_secs(30));
        let result = git.run_git(&["not-a-real-command"]).await;
        match result {
            Err(GitError::NonZeroExit {
                command, stderr, ..
            }) => {
                assert_eq!(command, "not-a-real-command");
                assert!(stderr.contains("not-a-real-command"), "stderr: {stderr}");
            }
            other => panic!("Expected NonZeroExit, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_work_dir_is_spawn_failure() {
        let git = GitCli::new(
            Some(PathBuf::from("/nonexistent/lazy-git/work-dir")),
            Duration::from_secs(30),
        );
        let result = git.staged_diff().await;
        assert!(matches!(result, Err(GitError::SpawnFailed(_))));
        assert!(!git.is_repository().await);
    }
}
