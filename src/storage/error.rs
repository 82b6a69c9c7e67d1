//! Storage layer error types
//!
//! All errors that can occur while reading or writing repository metadata
//! are defined here. We use `thiserror` for ergonomic error definition.

use std::path::PathBuf;

use thiserror::Error;

use crate::storage::types::{BranchName, InvalidNameError, ObjectId, ObjectKind};

/// the main error type for storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// the requested object is not in the store
    #[error("{kind} not found: {id}")]
    ObjectNotFound { kind: ObjectKind, id: ObjectId },

    /// no stored commit matches an abbreviated id
    #[error("no commit matches '{0}'")]
    UnknownRevision(String),

    /// an abbreviated id matches more than one commit
    #[error("commit id '{prefix}' is ambiguous: {matches} candidates")]
    AmbiguousRevision { prefix: String, matches: usize },

    /// the branch does not exist
    #[error("branch not found: {0}")]
    BranchNotFound(BranchName),

    /// branch already exists
    #[error("branch already exists: {0}")]
    BranchAlreadyExists(BranchName),

    /// attempt to delete the branch HEAD is on
    #[error("branch is checked out: {0}")]
    BranchCheckedOut(BranchName),

    /// invalid branch name or file name
    #[error("invalid name: {0}")]
    InvalidName(#[from] InvalidNameError),

    /// JSON serialization or deserialization failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// data integrity check failed
    #[error("corrupted data at {path}: {reason}")]
    CorruptedData { path: PathBuf, reason: String },

    /// I/O error (filesystem level)
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// an atomic replace of a record failed at the rename step
    #[error("failed to persist {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    /// check if this error indicates the resource doesn't exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StorageError::ObjectNotFound { .. }
                | StorageError::UnknownRevision(_)
                | StorageError::BranchNotFound(_)
        )
    }

    /// check if this error is a naming conflict
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            StorageError::BranchAlreadyExists(_) | StorageError::BranchCheckedOut(_)
        )
    }
}

/// result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
