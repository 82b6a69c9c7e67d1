//! Comparing the working tree against HEAD and the staging area.

use std::collections::BTreeSet;

use crate::storage::{Commit, RepoPath, StagingArea};
use crate::worktree::error::WorktreeResult;
use crate::worktree::WorkingTree;

/// Changes in the working tree that are not reflected in the index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorktreeStatus {
    /// contents differ from what would be committed
    pub modified: Vec<RepoPath>,
    /// would be committed, but the file is gone
    pub deleted: Vec<RepoPath>,
    /// present but neither tracked nor staged for addition
    pub untracked: Vec<RepoPath>,
}

impl WorktreeStatus {
    pub fn is_clean(&self) -> bool {
        self.modified.is_empty() && self.deleted.is_empty() && self.untracked.is_empty()
    }
}

/// Classify every relevant path.
///
/// A path is considered against the blob the next commit would record for
/// it: the staged addition if there is one, otherwise the HEAD version
/// unless it is staged for removal.
pub fn scan_status(
    tree: &WorkingTree,
    head: &Commit,
    stage: &StagingArea,
) -> WorktreeResult<WorktreeStatus> {
    let files: BTreeSet<RepoPath> = tree.list_files()?.into_iter().collect();

    let mut candidates: BTreeSet<&RepoPath> = files.iter().collect();
    candidates.extend(head.tree().keys());
    candidates.extend(stage.additions().map(|(path, _)| path));

    let mut status = WorktreeStatus::default();
    for path in candidates {
        let expected = match stage.added(path) {
            Some(id) => Some(id),
            None if stage.is_removed(path) => None,
            None => head.blob_at(path),
        };

        match (expected, files.contains(path)) {
            (Some(expected), true) => {
                let actual = tree.blob(path)?.map(|blob| blob.id());
                if actual != Some(expected) {
                    status.modified.push(path.clone());
                }
            }
            (Some(_), false) => status.deleted.push(path.clone()),
            (None, true) => status.untracked.push(path.clone()),
            (None, false) => {}
        }
    }

    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{epoch_timestamp, Blob, CommitBuilder, ObjectStore, Tree};
    use tempfile::TempDir;

    fn path(name: &str) -> RepoPath {
        RepoPath::new(name).unwrap()
    }

    #[test]
    fn test_scan_status() {
        let dir = TempDir::new().unwrap();
        let work = dir.path().join("work");
        std::fs::create_dir(&work).unwrap();
        let tree = WorkingTree::new(&work);
        let objects = ObjectStore::create(dir.path().join("objects")).unwrap();
        let mut stage = StagingArea::create(
            dir.path().join("index.json"),
            ObjectStore::create(dir.path().join("staging")).unwrap(),
        );

        let mut snapshot = Tree::new();
        for name in ["clean", "edited", "vanished", "removed"] {
            let blob = Blob::new(name.as_bytes().to_vec());
            objects.put(&blob).unwrap();
            snapshot.insert(path(name), blob.id());
        }
        let head = CommitBuilder::new(&objects)
            .tree(snapshot)
            .message("base")
            .timestamp(epoch_timestamp())
            .commit()
            .unwrap();

        tree.write(&path("clean"), b"clean").unwrap();
        tree.write(&path("edited"), b"changed").unwrap();
        tree.write(&path("removed"), b"back again").unwrap();
        stage.stage_removal(path("removed")).unwrap();
        // staged, then edited again
        stage.stage_addition(path("restaged"), &Blob::new(b"v1".to_vec())).unwrap();
        tree.write(&path("restaged"), b"v2").unwrap();
        // staged, then deleted
        stage.stage_addition(path("ghost"), &Blob::new(b"boo".to_vec())).unwrap();
        tree.write(&path("stray"), b"new file").unwrap();

        let status = scan_status(&tree, &head, &stage).unwrap();

        assert_eq!(status.modified, vec![path("edited"), path("restaged")]);
        assert_eq!(status.deleted, vec![path("ghost"), path("vanished")]);
        assert_eq!(status.untracked, vec![path("removed"), path("stray")]);
        assert!(!status.is_clean());
    }
}
