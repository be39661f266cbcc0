//! Change-to-suggestion pipeline.
//!
//! Checks that the working directory is a repository, picks the diff for the
//! task, and hands it to the backend. Nothing is retried: the first failure
//! ends the request.

use tracing::debug;

use crate::error::{DiffKind, SuggestError};
use crate::git::{DiffResult, DiffSource};
use crate::llm::{SuggestionBackend, TaskKind};

/// Sequences diff acquisition and generation for each request.
pub struct Suggester {
    diffs: Box<dyn DiffSource>,
    backend: Box<dyn SuggestionBackend>,
}

impl Suggester {
    pub fn new(diffs: Box<dyn DiffSource>, backend: Box<dyn SuggestionBackend>) -> Self {
        Self { diffs, backend }
    }

    /// Suggest a commit message for the staged changes.
    ///
    /// Only staged changes are considered; with nothing staged this fails with
    /// [`SuggestError::NoStagedChanges`] even if the working tree is dirty.
    pub async fn commit_message(&self) -> Result<String, SuggestError> {
        self.ensure_repository().await?;

        let diff = self.staged().await?;
        if !diff.has_changes() {
            return Err(SuggestError::NoStagedChanges);
        }

        self.generate(diff, TaskKind::CommitMessage).await
    }

    /// Suggest a branch name for the pending changes.
    ///
    /// Uses the staged diff when there is one, otherwise the unstaged diff.
    pub async fn branch_name(&self) -> Result<String, SuggestError> {
        self.ensure_repository().await?;

        let mut diff = self.staged().await?;
        if !diff.has_changes() {
            debug!("nothing staged, falling back to working tree diff");
            diff = self
                .diffs
                .working_diff()
                .await
                .map_err(|source| SuggestError::Diff {
                    which: DiffKind::Working,
                    source,
                })?;
        }

        if !diff.has_changes() {
            return Err(SuggestError::NoChanges);
        }

        self.generate(diff, TaskKind::BranchName).await
    }

    async fn ensure_repository(&self) -> Result<(), SuggestError> {
        if !self.diffs.is_repository().await {
            return Err(SuggestError::NotARepository);
        }
        Ok(())
    }

    async fn staged(&self) -> Result<DiffResult, SuggestError> {
        self.diffs
            .staged_diff()
            .await
            .map_err(|source| SuggestError::Diff {
                which: DiffKind::Staged,
                source,
            })
    }

    async fn generate(&self, diff: DiffResult, task: TaskKind) -> Result<String, SuggestError> {
        debug!(
            %task,
            provider = %self.backend.provider(),
            files = diff.files_changed(),
            bytes = diff.content().len(),
            "generating suggestion"
        );

        self.backend
            .generate(diff.content(), task)
            .await
            .map_err(|source| SuggestError::Generation { task, source })
    }
}
