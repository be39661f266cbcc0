//! Diff snapshots returned by a [`DiffSource`](super::DiffSource).

/// Header line git emits at the start of every per-file section.
pub const FILE_HEADER_MARKER: &str = "diff --git";

/// One diff query's output.
///
/// Fields are private so a result can't be edited after the fact; callers
/// that need a different diff ask the source again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffResult {
    content: String,
    files_changed: usize,
    has_changes: bool,
}

impl DiffResult {
    pub fn from_content(content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            files_changed: count_files(&content),
            has_changes: !content.is_empty(),
            content,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn into_content(self) -> String {
        self.content
    }

    /// Number of files touched, estimated by [`count_files`].
    pub fn files_changed(&self) -> usize {
        self.files_changed
    }

    pub fn has_changes(&self) -> bool {
        self.has_changes
    }
}

/// Count per-file sections by scanning for [`FILE_HEADER_MARKER`].
///
/// This is a text heuristic, not a parse: a changed line that happens to
/// contain the marker is counted too. Use it for display only.
pub fn count_files(diff: &str) -> usize {
    diff.matches(FILE_HEADER_MARKER).count()
}
