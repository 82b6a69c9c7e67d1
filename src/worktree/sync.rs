//! Bringing the working tree in line with a commit.
//!
//! Guards run before any file is touched: callers check with
//! [`guard_untracked_overwrite`] (or [`guard_untracked`]) first and only then
//! call [`materialize`], so a refused checkout leaves the tree as it was.

use tracing::debug;

use crate::storage::{Blob, Commit, ObjectStore, RepoPath, StagingArea};
use crate::worktree::error::{WorktreeError, WorktreeResult};
use crate::worktree::WorkingTree;

/// Working files that are neither tracked by `head` nor staged.
pub fn untracked_files(
    tree: &WorkingTree,
    head: &Commit,
    stage: &StagingArea,
) -> WorktreeResult<Vec<RepoPath>> {
    Ok(tree
        .list_files()?
        .into_iter()
        .filter(|path| !head.tracks(path) && !stage.contains(path))
        .collect())
}

/// Fail if any untracked file satisfies `touched`.
pub fn guard_untracked<F>(
    tree: &WorkingTree,
    head: &Commit,
    stage: &StagingArea,
    touched: F,
) -> WorktreeResult<()>
where
    F: Fn(&RepoPath) -> bool,
{
    let in_the_way: Vec<RepoPath> = untracked_files(tree, head, stage)?
        .into_iter()
        .filter(|path| touched(path))
        .collect();

    if in_the_way.is_empty() {
        Ok(())
    } else {
        debug!(count = in_the_way.len(), "untracked files block checkout");
        Err(WorktreeError::UntrackedOverwrite { paths: in_the_way })
    }
}

/// Fail if materializing `target` would clobber an untracked file.
///
/// Untracked files are never deleted by [`materialize`] (it only deletes
/// files `head` tracks), so only paths `target` writes can collide.
pub fn guard_untracked_overwrite(
    tree: &WorkingTree,
    head: &Commit,
    stage: &StagingArea,
    target: &Commit,
) -> WorktreeResult<()> {
    guard_untracked(tree, head, stage, |path| target.tracks(path))
}

/// Replace the tracked contents of the working tree.
///
/// Files tracked by `previous` but not by `target` are deleted; every file
/// in `target` is written, overwriting whatever is there.
pub fn materialize(
    tree: &WorkingTree,
    objects: &ObjectStore,
    previous: &Commit,
    target: &Commit,
) -> WorktreeResult<()> {
    let mut removed = 0usize;
    for path in previous.tree().keys() {
        if !target.tracks(path) {
            tree.remove(path)?;
            removed += 1;
        }
    }

    for (path, blob_id) in target.tree() {
        let blob: Blob = objects.get(blob_id.raw())?;
        tree.write(path, blob.contents())?;
    }

    debug!(
        target = %target.id().short(),
        written = target.tree().len(),
        removed,
        "materialized commit"
    );
    Ok(())
}

/// Restore one file from `commit`.
pub fn checkout_path(
    tree: &WorkingTree,
    objects: &ObjectStore,
    commit: &Commit,
    path: &RepoPath,
) -> WorktreeResult<()> {
    let blob_id = commit
        .blob_at(path)
        .ok_or_else(|| WorktreeError::FileNotInCommit(path.clone()))?;
    let blob: Blob = objects.get(blob_id.raw())?;
    tree.write(path, blob.contents())?;
    debug!(%path, commit = %commit.id().short(), "checked out file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{epoch_timestamp, CommitBuilder, Tree};
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        tree: WorkingTree,
        objects: ObjectStore,
        stage: StagingArea,
    }

    fn setup() -> Fixture {
        let dir = TempDir::new().unwrap();
        let work = dir.path().join("work");
        std::fs::create_dir(&work).unwrap();
        let objects = ObjectStore::create(dir.path().join("objects")).unwrap();
        let staging = ObjectStore::create(dir.path().join("staging")).unwrap();
        let stage = StagingArea::create(dir.path().join("index.json"), staging);
        Fixture {
            tree: WorkingTree::new(work),
            objects,
            stage,
            _dir: dir,
        }
    }

    fn path(name: &str) -> RepoPath {
        RepoPath::new(name).unwrap()
    }

    fn commit(objects: &ObjectStore, files: &[(&str, &[u8])]) -> Commit {
        let mut tree = Tree::new();
        for (name, contents) in files {
            let blob = Blob::new(contents.to_vec());
            objects.put(&blob).unwrap();
            tree.insert(path(name), blob.id());
        }
        CommitBuilder::new(objects)
            .tree(tree)
            .message(format!("{} files", files.len()))
            .timestamp(epoch_timestamp())
            .commit()
            .unwrap()
    }

    #[test]
    fn test_materialize_into_empty_tree() {
        let fx = setup();
        let empty = commit(&fx.objects, &[]);
        let target = commit(&fx.objects, &[("a", b"1"), ("b", b"2")]);

        materialize(&fx.tree, &fx.objects, &empty, &target).unwrap();

        assert_eq!(fx.tree.list_files().unwrap(), vec![path("a"), path("b")]);
        assert_eq!(fx.tree.read(&path("a")).unwrap(), Some(b"1".to_vec()));
        assert_eq!(fx.tree.read(&path("b")).unwrap(), Some(b"2".to_vec()));
    }

    #[test]
    fn test_materialize_removes_previously_tracked() {
        let fx = setup();
        let previous = commit(&fx.objects, &[("old", b"x"), ("both", b"v1")]);
        let target = commit(&fx.objects, &[("both", b"v2")]);
        materialize(&fx.tree, &fx.objects, &commit(&fx.objects, &[]), &previous).unwrap();
        fx.tree.write(&path("mine"), b"untracked").unwrap();

        materialize(&fx.tree, &fx.objects, &previous, &target).unwrap();

        assert!(!fx.tree.exists(&path("old")));
        assert_eq!(fx.tree.read(&path("both")).unwrap(), Some(b"v2".to_vec()));
        // untracked files are left alone
        assert_eq!(fx.tree.read(&path("mine")).unwrap(), Some(b"untracked".to_vec()));
    }

    #[test]
    fn test_guard_blocks_untracked_overwrite() {
        let fx = setup();
        let head = commit(&fx.objects, &[]);
        let target = commit(&fx.objects, &[("f", b"theirs")]);
        fx.tree.write(&path("f"), b"mine").unwrap();

        let result = guard_untracked_overwrite(&fx.tree, &head, &fx.stage, &target);
        match result {
            Err(WorktreeError::UntrackedOverwrite { paths }) => assert_eq!(paths, vec![path("f")]),
            other => panic!("expected untracked overwrite, got {:?}", other),
        }
        // nothing was touched
        assert_eq!(fx.tree.read(&path("f")).unwrap(), Some(b"mine".to_vec()));
    }

    #[test]
    fn test_guard_allows_tracked_and_staged() {
        let mut fx = setup();
        let head = commit(&fx.objects, &[("tracked", b"1")]);
        let target = commit(&fx.objects, &[("tracked", b"2"), ("staged", b"3")]);
        fx.tree.write(&path("tracked"), b"1").unwrap();
        fx.tree.write(&path("staged"), b"local").unwrap();
        fx.stage
            .stage_addition(path("staged"), &Blob::new(b"local".to_vec()))
            .unwrap();
        fx.tree.write(&path("unrelated"), b"untracked").unwrap();

        guard_untracked_overwrite(&fx.tree, &head, &fx.stage, &target).unwrap();
        assert_eq!(
            untracked_files(&fx.tree, &head, &fx.stage).unwrap(),
            vec![path("unrelated")]
        );
    }

    #[test]
    fn test_checkout_path() {
        let fx = setup();
        let c = commit(&fx.objects, &[("f", b"committed")]);
        fx.tree.write(&path("f"), b"edited").unwrap();

        checkout_path(&fx.tree, &fx.objects, &c, &path("f")).unwrap();
        assert_eq!(fx.tree.read(&path("f")).unwrap(), Some(b"committed".to_vec()));

        let missing = checkout_path(&fx.tree, &fx.objects, &c, &path("nope"));
        assert!(matches!(missing, Err(WorktreeError::FileNotInCommit(_))));
    }
}
