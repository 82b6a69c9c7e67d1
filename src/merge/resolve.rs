//! Three-way, per-file resolution.
//!
//! For each path in the union of the split, current and given trees the
//! three (possibly absent) blob ids decide the outcome:
//!
//! | split vs current | split vs given | current vs given | result            |
//! |------------------|----------------|------------------|-------------------|
//! | any              | any            | equal            | keep current      |
//! | equal            | differs        | differs          | take given        |
//! | differs          | equal          | differs          | keep current      |
//! | differs          | differs        | differs          | conflict          |
//!
//! "Take given" deletes the file when given no longer has it.

use std::collections::BTreeSet;

use crate::storage::{BlobId, RepoPath, Tree};

/// One change the merge applies on top of the current tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeAction {
    /// write given's version and stage it
    Take { path: RepoPath, blob: BlobId },
    /// given deleted a file current left untouched
    Delete { path: RepoPath },
    /// both sides changed the file differently
    Conflict {
        path: RepoPath,
        current: Option<BlobId>,
        given: Option<BlobId>,
    },
}

impl MergeAction {
    pub fn path(&self) -> &RepoPath {
        match self {
            Self::Take { path, .. } | Self::Delete { path } | Self::Conflict { path, .. } => path,
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

/// The actions needed to merge given into current, in path order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergePlan {
    actions: Vec<MergeAction>,
}

impl MergePlan {
    pub fn actions(&self) -> &[MergeAction] {
        &self.actions
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// whether the plan writes or deletes `path`
    pub fn touches(&self, path: &RepoPath) -> bool {
        self.actions.iter().any(|action| action.path() == path)
    }

    pub fn conflicts(&self) -> impl Iterator<Item = &RepoPath> {
        self.actions
            .iter()
            .filter(|action| action.is_conflict())
            .map(MergeAction::path)
    }

    pub fn has_conflicts(&self) -> bool {
        self.actions.iter().any(MergeAction::is_conflict)
    }
}

/// Resolve a single path.
pub fn resolve_path(
    path: &RepoPath,
    split: Option<BlobId>,
    current: Option<BlobId>,
    given: Option<BlobId>,
) -> Option<MergeAction> {
    if current == given || split == given {
        return None;
    }

    if split == current {
        return Some(match given {
            Some(blob) => MergeAction::Take {
                path: path.clone(),
                blob,
            },
            None => MergeAction::Delete { path: path.clone() },
        });
    }

    Some(MergeAction::Conflict {
        path: path.clone(),
        current,
        given,
    })
}

/// Build the merge plan for three trees.
pub fn plan_merge(split: &Tree, current: &Tree, given: &Tree) -> MergePlan {
    let paths: BTreeSet<&RepoPath> = split
        .keys()
        .chain(current.keys())
        .chain(given.keys())
        .collect();

    let actions = paths
        .into_iter()
        .filter_map(|path| {
            resolve_path(
                path,
                split.get(path).copied(),
                current.get(path).copied(),
                given.get(path).copied(),
            )
        })
        .collect();

    MergePlan { actions }
}

/// Contents written for a conflicted file; an absent side counts as empty.
pub fn conflict_contents(current: Option<&[u8]>, given: Option<&[u8]>) -> Vec<u8> {
    let current = current.unwrap_or_default();
    let given = given.unwrap_or_default();

    let mut out = Vec::with_capacity(current.len() + given.len() + 32);
    out.extend_from_slice(b"<<<<<<< HEAD\n");
    out.extend_from_slice(current);
    out.extend_from_slice(b"=======\n");
    out.extend_from_slice(given);
    out.extend_from_slice(b">>>>>>>\n");
    out
}
