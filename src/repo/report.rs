//! Printable views of repository state.

use std::fmt;

use crate::storage::{BranchName, Commit, CommitId, RepoPath};
use crate::worktree::WorktreeStatus;

/// One commit as shown by `log` and `global-log`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub id: CommitId,
    /// both parents, for merge commits only
    pub merge_parents: Option<(CommitId, CommitId)>,
    pub timestamp: String,
    pub message: String,
}

impl From<&Commit> for LogEntry {
    fn from(commit: &Commit) -> Self {
        let merge_parents = match commit.parents() {
            [first, second, ..] => Some((*first, *second)),
            _ => None,
        };
        Self {
            id: commit.id(),
            merge_parents,
            timestamp: commit.timestamp().to_string(),
            message: commit.message().to_string(),
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "===")?;
        writeln!(f, "commit {}", self.id)?;
        if let Some((first, second)) = &self.merge_parents {
            writeln!(f, "Merge: {} {}", first.short(), second.short())?;
        }
        writeln!(f, "Date: {}", self.timestamp)?;
        writeln!(f, "{}", self.message)
    }
}

/// Everything `status` prints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub current_branch: BranchName,
    pub branches: Vec<BranchName>,
    pub staged: Vec<RepoPath>,
    pub removed: Vec<RepoPath>,
    pub worktree: WorktreeStatus,
}

impl StatusReport {
    /// true when nothing is staged and the working tree matches HEAD
    pub fn is_clean(&self) -> bool {
        self.staged.is_empty() && self.removed.is_empty() && self.worktree.is_clean()
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Branches ===")?;
        for branch in &self.branches {
            if *branch == self.current_branch {
                writeln!(f, "*{}", branch)?;
            } else {
                writeln!(f, "{}", branch)?;
            }
        }
        writeln!(f)?;

        writeln!(f, "=== Staged Files ===")?;
        for path in &self.staged {
            writeln!(f, "{}", path)?;
        }
        writeln!(f)?;

        writeln!(f, "=== Removed Files ===")?;
        for path in &self.removed {
            writeln!(f, "{}", path)?;
        }
        writeln!(f)?;

        // both lists are sorted, so merge them to keep the section sorted
        let mut changes: Vec<(&RepoPath, &str)> = self
            .worktree
            .modified
            .iter()
            .map(|path| (path, "modified"))
            .chain(self.worktree.deleted.iter().map(|path| (path, "deleted")))
            .collect();
        changes.sort();

        writeln!(f, "=== Modifications Not Staged For Commit ===")?;
        for (path, kind) in changes {
            writeln!(f, "{} ({})", path, kind)?;
        }
        writeln!(f)?;

        writeln!(f, "=== Untracked Files ===")?;
        for path in &self.worktree.untracked {
            writeln!(f, "{}", path)?;
        }
        writeln!(f)
    }
}
