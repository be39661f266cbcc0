//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use git2::{Oid, Repository, Signature};

use lazy_git::{BackendError, GitCli, Provider, SuggestionBackend, TaskKind};

/// A throwaway git repository for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository in a temp directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");
        Self { dir, repo }
    }

    /// Create a repository with one committed file, `README.md`.
    pub fn with_initial_commit() -> Self {
        let repo = Self::new();
        repo.stage_file("README.md", "# test\n");
        repo.commit("chore: initial commit");
        repo
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// A git runner rooted at this repository.
    pub fn git(&self) -> GitCli {
        GitCli::new(Some(self.path().to_path_buf()), Duration::from_secs(30))
    }

    fn signature(&self) -> Signature<'_> {
        Signature::now("Test User", "test@example.com").expect("Failed to create signature")
    }

    /// Write a file in the working tree without staging it.
    pub fn write_file(&self, name: &str, content: &str) {
        std::fs::write(self.path().join(name), content).expect("Failed to write test file");
    }

    /// Write a file and add it to the index.
    pub fn stage_file(&self, name: &str, content: &str) {
        self.write_file(name, content);
        let mut index = self.repo.index().expect("Failed to get index");
        index.add_path(Path::new(name)).expect("Failed to add file");
        index.write().expect("Failed to write index");
    }

    /// Commit the current index. Returns the commit OID.
    pub fn commit(&self, message: &str) -> Oid {
        let sig = self.signature();
        let mut index = self.repo.index().expect("Failed to get index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }
}

/// Backend double that records every call and replies with a fixed result.
#[derive(Clone)]
pub struct RecordingBackend {
    reply: Result<String, String>,
    calls: Arc<Mutex<Vec<(String, TaskKind)>>>,
}

impl RecordingBackend {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            calls: Arc::default(),
        }
    }

    /// Fail every call with a `BackendError::Request` carrying `diagnostic`.
    pub fn failing(diagnostic: &str) -> Self {
        Self {
            reply: Err(diagnostic.to_string()),
            calls: Arc::default(),
        }
    }

    pub fn calls(&self) -> Vec<(String, TaskKind)> {
        self.calls.lock().expect("calls lock poisoned").clone()
    }
}

#[async_trait]
impl SuggestionBackend for RecordingBackend {
    fn provider(&self) -> Provider {
        Provider::OpenAi
    }

    async fn generate(&self, diff: &str, task: TaskKind) -> Result<String, BackendError> {
        self.calls
            .lock()
            .expect("calls lock poisoned")
            .push((diff.to_string(), task));
        if diff.is_empty() {
            return Err(BackendError::EmptyInput);
        }
        self.reply.clone().map_err(|reason| BackendError::Request {
            provider: Provider::OpenAi,
            reason,
        })
    }
}
