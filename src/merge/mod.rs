//! Merge engine.
//!
//! A merge of branch `given` into the current branch goes through:
//!
//! ```text
//!   preconditions ──► split point ──► short circuit?
//!                                      │ given is ancestor   → up to date
//!                                      │ current is ancestor → fast-forward
//!                                      ▼
//!                          three-way plan ──► untracked guard
//!                                                   │
//!                                                   ▼
//!                               apply plan, stage, merge commit
//! ```
//!
//! This module holds the pure parts (split point search, planning, conflict
//! rendering). The repository session drives the steps that touch refs,
//! the index and the working tree.

mod resolve;
mod split;

use std::fmt;

use crate::storage::{CommitId, RepoPath};

pub use resolve::{conflict_contents, plan_merge, resolve_path, MergeAction, MergePlan};
pub use split::{find_split_point, is_ancestor};

/// How a merge finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// given was already part of current's history
    UpToDate,
    /// current was behind given; the branch moved without a merge commit
    FastForward { to: CommitId },
    /// a merge commit was created
    Merged {
        commit: CommitId,
        conflicts: Vec<RepoPath>,
    },
}

impl MergeOutcome {
    pub fn had_conflicts(&self) -> bool {
        matches!(self, Self::Merged { conflicts, .. } if !conflicts.is_empty())
    }

    /// the commit HEAD ends up on, if the merge moved it
    pub fn new_head(&self) -> Option<CommitId> {
        match self {
            Self::UpToDate => None,
            Self::FastForward { to } => Some(*to),
            Self::Merged { commit, .. } => Some(*commit),
        }
    }
}

impl fmt::Display for MergeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UpToDate => write!(f, "Given branch is an ancestor of the current branch."),
            Self::FastForward { .. } => write!(f, "Current branch fast-forwarded."),
            Self::Merged { conflicts, .. } if !conflicts.is_empty() => {
                write!(f, "Encountered a merge conflict.")
            }
            Self::Merged { .. } => Ok(()),
        }
    }
}

/// message recorded on a merge commit
pub fn merge_message(given: &str, current: &str) -> String {
    format!("Merged {} into {}.", given, current)
}
