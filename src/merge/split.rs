//! Split point (merge base) search.
//!
//! The current side is walked along first parents only, recording each
//! commit's distance from the tip. The given side is walked breadth-first
//! over every parent. Of the given side's ancestors that also appear on the
//! current chain, the one closest to the current tip is the split point.
//!
//! Depths on a first-parent chain are distinct, so two candidates can never
//! tie; the first one reached in breadth-first order would win if they could.
//!
//! Because only first parents are walked on the current side, a branch that
//! was merged in through a second parent is not found as the split point.
//! [`is_ancestor`] walks every parent and catches that case.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::debug;

use crate::storage::{get_commit, history, CommitId, ObjectStore, StorageResult};

/// Find the split point of `current` and `given`, or `None` if their
/// histories are disjoint.
pub fn find_split_point(
    store: &ObjectStore,
    current: CommitId,
    given: CommitId,
) -> StorageResult<Option<CommitId>> {
    let mut depth_of: HashMap<CommitId, usize> = HashMap::new();
    for (depth, commit) in history(store, current).enumerate() {
        depth_of.insert(commit?.id(), depth);
    }

    let mut best: Option<(usize, CommitId)> = None;
    let mut queue = VecDeque::from([given]);
    let mut seen = HashSet::from([given]);

    while let Some(id) = queue.pop_front() {
        if let Some(&depth) = depth_of.get(&id) {
            if best.map_or(true, |(best_depth, _)| depth < best_depth) {
                best = Some((depth, id));
                if depth == 0 {
                    break;
                }
            }
        }

        for parent in get_commit(store, id)?.parents() {
            if seen.insert(*parent) {
                queue.push_back(*parent);
            }
        }
    }

    let split = best.map(|(_, id)| id);
    debug!(
        current = %current.short(),
        given = %given.short(),
        split = ?split.map(|id| id.short()),
        "found split point"
    );
    Ok(split)
}

/// Whether `ancestor` is reachable from `descendant` over any parents.
/// A commit counts as its own ancestor.
pub fn is_ancestor(
    store: &ObjectStore,
    ancestor: CommitId,
    descendant: CommitId,
) -> StorageResult<bool> {
    let mut queue = VecDeque::from([descendant]);
    let mut seen = HashSet::from([descendant]);

    while let Some(id) = queue.pop_front() {
        if id == ancestor {
            return Ok(true);
        }
        for parent in get_commit(store, id)?.parents() {
            if seen.insert(*parent) {
                queue.push_back(*parent);
            }
        }
    }
    Ok(false)
}
