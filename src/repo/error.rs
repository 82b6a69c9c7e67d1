//! Repository error types.
//!
//! Every failure a user can cause has its own variant whose `Display` is
//! the exact message shown to them. Storage failures are wrapped as-is.

use std::path::PathBuf;

use thiserror::Error;

use crate::storage::{InvalidNameError, RepoPath, StorageError};
use crate::worktree::WorktreeError;

/// Result type for repository operations.
pub type RepoResult<T> = Result<T, RepoError>;

/// The operation a branch lookup failed in; the wording differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchOp {
    Checkout,
    Remove,
    Merge,
}

impl BranchOp {
    fn no_such_branch(self) -> &'static str {
        match self {
            Self::Checkout => "No such branch exists.",
            Self::Remove | Self::Merge => "A branch with that name does not exist.",
        }
    }

    fn current_branch(self) -> &'static str {
        match self {
            Self::Checkout => "No need to checkout the current branch.",
            Self::Remove => "Cannot remove the current branch.",
            Self::Merge => "Cannot merge a branch with itself.",
        }
    }
}

/// Repository errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not in an initialized gitlite directory.")]
    NotInitialized(PathBuf),

    #[error("A gitlite version-control system already exists in the current directory.")]
    AlreadyInitialized(PathBuf),

    #[error("Please enter a command.")]
    NoCommand,

    #[error("No command with that name exists.")]
    UnknownCommand(String),

    #[error("Incorrect operands.")]
    InvalidArguments,

    #[error("Invalid name '{name}': {source}")]
    InvalidName {
        name: String,
        #[source]
        source: InvalidNameError,
    },

    #[error("File does not exist.")]
    FileNotFound(RepoPath),

    #[error("No commit with that id exists.")]
    CommitNotFound(String),

    #[error("Commit id is ambiguous.")]
    AmbiguousCommitId(String),

    #[error("Found no commit with that message.")]
    MessageNotFound(String),

    #[error("{}", .op.no_such_branch())]
    NoSuchBranch { name: String, op: BranchOp },

    #[error("A branch with that name already exists.")]
    DuplicateBranch(String),

    #[error("{}", .op.current_branch())]
    CurrentBranch { name: String, op: BranchOp },

    #[error("File does not exist in that commit.")]
    FileNotInCommit(RepoPath),

    #[error("There is an untracked file in the way; delete it, or add and commit it first.")]
    UntrackedOverwrite(Vec<RepoPath>),

    #[error("You have uncommitted changes.")]
    DirtyStaging,

    #[error("Cannot merge a branch with itself.")]
    SelfMerge,

    #[error("No changes added to the commit.")]
    NothingToCommit,

    #[error("Please enter a commit message.")]
    EmptyMessage,

    #[error("No reason to remove the file.")]
    NoReasonToRemove(RepoPath),

    #[error("storage error: {0}")]
    Storage(StorageError),
}

impl RepoError {
    /// true for failures caused by the request rather than the environment
    pub fn is_user_error(&self) -> bool {
        !matches!(self, RepoError::Storage(_))
    }

    pub(crate) fn invalid_name(name: &str, source: InvalidNameError) -> Self {
        Self::InvalidName {
            name: name.to_string(),
            source,
        }
    }
}

impl From<StorageError> for RepoError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::UnknownRevision(spec) => Self::CommitNotFound(spec),
            StorageError::AmbiguousRevision { prefix, .. } => Self::AmbiguousCommitId(prefix),
            StorageError::BranchAlreadyExists(name) => Self::DuplicateBranch(name.to_string()),
            other => Self::Storage(other),
        }
    }
}

impl From<WorktreeError> for RepoError {
    fn from(e: WorktreeError) -> Self {
        match e {
            WorktreeError::UntrackedOverwrite { paths } => Self::UntrackedOverwrite(paths),
            WorktreeError::FileNotInCommit(path) => Self::FileNotInCommit(path),
            WorktreeError::Storage(e) => e.into(),
        }
    }
}

impl From<std::io::Error> for RepoError {
    fn from(e: std::io::Error) -> Self {
        Self::Storage(StorageError::Io(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::BranchName;

    #[test]
    fn test_branch_messages_depend_on_operation() {
        let checkout = RepoError::NoSuchBranch { name: "x".into(), op: BranchOp::Checkout };
        let remove = RepoError::NoSuchBranch { name: "x".into(), op: BranchOp::Remove };
        assert_eq!(checkout.to_string(), "No such branch exists.");
        assert_eq!(remove.to_string(), "A branch with that name does not exist.");

        let current = RepoError::CurrentBranch { name: "master".into(), op: BranchOp::Checkout };
        assert_eq!(current.to_string(), "No need to checkout the current branch.");
        let current = RepoError::CurrentBranch { name: "master".into(), op: BranchOp::Remove };
        assert_eq!(current.to_string(), "Cannot remove the current branch.");
        let current = RepoError::CurrentBranch { name: "master".into(), op: BranchOp::Merge };
        assert_eq!(current.to_string(), RepoError::SelfMerge.to_string());
    }

    #[test]
    fn test_storage_mapping() {
        let err: RepoError = StorageError::UnknownRevision("abcd".into()).into();
        assert!(matches!(err, RepoError::CommitNotFound(_)));
        assert_eq!(err.to_string(), "No commit with that id exists.");

        let err: RepoError = StorageError::AmbiguousRevision {
            prefix: "abcd".into(),
            matches: 2,
        }
        .into();
        assert!(matches!(err, RepoError::AmbiguousCommitId(ref prefix) if prefix == "abcd"));
        assert_eq!(err.to_string(), "Commit id is ambiguous.");
        assert!(err.is_user_error());

        let err: RepoError = StorageError::BranchAlreadyExists(BranchName::default()).into();
        assert!(matches!(err, RepoError::DuplicateBranch(_)));

        let err: RepoError = StorageError::Io(std::io::Error::other("disk")).into();
        assert!(!err.is_user_error());
    }

    #[test]
    fn test_worktree_mapping() {
        let path = RepoPath::new("f").unwrap();
        let err: RepoError = WorktreeError::UntrackedOverwrite { paths: vec![path.clone()] }.into();
        assert_eq!(
            err.to_string(),
            "There is an untracked file in the way; delete it, or add and commit it first."
        );
        let err: RepoError = WorktreeError::FileNotInCommit(path).into();
        assert!(err.is_user_error());
    }
}
