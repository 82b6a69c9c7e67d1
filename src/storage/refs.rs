//!  Branch and reference management.
//!
//!  Refs are pointers to commits. This module handles:
//! - HEAD and the branch it is attached to
//! - branch lifecycle (create, move, delete)
//! - persisting the whole table as one record
//!
//! HEAD and the current branch live in the same record as the branch table,
//! so switching branches is a single atomic write.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::persist::{read_json, write_json};
use crate::storage::types::{BranchName, CommitId};

/// the persisted reference record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct RefTable {
    head: CommitId,
    current_branch: BranchName,
    branches: BTreeMap<BranchName, CommitId>,
}

/// Manages HEAD and the branch table.
#[derive(Debug)]
pub struct RefManager {
    path: PathBuf,
    table: RefTable,
}

impl RefManager {
    /// Start a fresh table with a single branch at `initial_commit`.
    ///
    /// Nothing is written until [`RefManager::save`].
    pub fn init(path: impl Into<PathBuf>, branch: BranchName, initial_commit: CommitId) -> Self {
        let mut branches = BTreeMap::new();
        branches.insert(branch.clone(), initial_commit);
        Self {
            path: path.into(),
            table: RefTable {
                head: initial_commit,
                current_branch: branch,
                branches,
            },
        }
    }

    /// Load the table, checking that HEAD agrees with the current branch.
    pub fn load(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();
        let table: RefTable = read_json(&path)?;

        match table.branches.get(&table.current_branch) {
            Some(tip) if *tip == table.head => {}
            Some(tip) => {
                return Err(StorageError::CorruptedData {
                    path,
                    reason: format!(
                        "HEAD is {} but branch {} points at {}",
                        table.head.short(),
                        table.current_branch,
                        tip.short()
                    ),
                })
            }
            None => {
                return Err(StorageError::CorruptedData {
                    path,
                    reason: format!("current branch {} is missing", table.current_branch),
                })
            }
        }

        Ok(Self { path, table })
    }

    /// Write the table back to disk.
    pub fn save(&self) -> StorageResult<()> {
        write_json(&self.path, &self.table)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the current HEAD commit.
    pub fn head(&self) -> CommitId {
        self.table.head
    }

    /// the branch HEAD is attached to
    pub fn current_branch(&self) -> &BranchName {
        &self.table.current_branch
    }

    /// every branch and the commit it points at
    pub fn branches(&self) -> &BTreeMap<BranchName, CommitId> {
        &self.table.branches
    }

    /// Check if a branch exists.
    pub fn branch_exists(&self, branch: &BranchName) -> bool {
        self.table.branches.contains_key(branch)
    }

    /// Resolve a branch name to its current commit ID.
    pub fn resolve_branch(&self, branch: &BranchName) -> StorageResult<CommitId> {
        self.table
            .branches
            .get(branch)
            .copied()
            .ok_or_else(|| StorageError::BranchNotFound(branch.clone()))
    }

    /// Move HEAD and the current branch together.
    pub fn set_head(&mut self, target: CommitId) {
        debug!(branch = %self.table.current_branch, target = %target.short(), "moving HEAD");
        self.table.head = target;
        self.table
            .branches
            .insert(self.table.current_branch.clone(), target);
    }

    /// Create a new branch pointing to the given commit.
    pub fn create_branch(&mut self, branch: &BranchName, target: CommitId) -> StorageResult<()> {
        if self.branch_exists(branch) {
            return Err(StorageError::BranchAlreadyExists(branch.clone()));
        }
        debug!(%branch, target = %target.short(), "creating branch");
        self.table.branches.insert(branch.clone(), target);
        Ok(())
    }

    /// Delete a branch pointer. The commits it pointed at are kept.
    pub fn delete_branch(&mut self, branch: &BranchName) -> StorageResult<()> {
        if !self.branch_exists(branch) {
            return Err(StorageError::BranchNotFound(branch.clone()));
        }
        if *branch == self.table.current_branch {
            return Err(StorageError::BranchCheckedOut(branch.clone()));
        }
        debug!(%branch, "deleting branch");
        self.table.branches.remove(branch);
        Ok(())
    }

    /// Attach HEAD to another branch, moving HEAD to its tip.
    pub fn switch_to(&mut self, branch: &BranchName) -> StorageResult<CommitId> {
        let tip = self.resolve_branch(branch)?;
        debug!(from = %self.table.current_branch, to = %branch, "switching branch");
        self.table.current_branch = branch.clone();
        self.table.head = tip;
        Ok(tip)
    }
}
