//! Working tree error types.

use thiserror::Error;

use crate::storage::{RepoPath, StorageError};

/// Result type for working tree operations.
pub type WorktreeResult<T> = Result<T, WorktreeError>;

/// Errors that can occur while syncing the working tree.
#[derive(Debug, Error)]
pub enum WorktreeError {
    /// Storage layer error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Untracked files would be overwritten by a checkout.
    #[error("untracked files in the way: {}", paths_display(.paths))]
    UntrackedOverwrite {
        /// Untracked working files the checkout would replace.
        paths: Vec<RepoPath>,
    },

    /// The commit does not track the requested file.
    #[error("file not in commit: {0}")]
    FileNotInCommit(RepoPath),
}

impl From<std::io::Error> for WorktreeError {
    fn from(e: std::io::Error) -> Self {
        Self::Storage(StorageError::Io(e))
    }
}

fn paths_display(paths: &[RepoPath]) -> String {
    paths
        .iter()
        .map(RepoPath::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untracked_message_lists_paths() {
        let err = WorktreeError::UntrackedOverwrite {
            paths: vec![RepoPath::new("a").unwrap(), RepoPath::new("b").unwrap()],
        };
        assert_eq!(err.to_string(), "untracked files in the way: a, b");
    }
}
