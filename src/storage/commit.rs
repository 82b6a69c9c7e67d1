//!  Commit creation and history traversal
//!
//!  commits are the nodes of the history graph:
//! - each commit holds a complete snapshot (path -> blob), never a delta
//! - a commit has no parents (the root), one, or two (a merge)
//! - history is append-only; nothing here deletes a commit
//!
//! this module handles commit creation, first-parent history walking,
//! global enumeration and abbreviated-id lookup

use std::collections::BTreeMap;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::hash::hash_object;
use crate::storage::object::{ObjectStore, StoredObject};
use crate::storage::types::{BlobId, CommitId, ObjectId, ObjectKind, RepoPath};

/// A commit's snapshot: every tracked path and the blob it points at.
pub type Tree = BTreeMap<RepoPath, BlobId>;

/// `Thu Nov 9 20:00:05 2017 -0800`
pub const TIMESTAMP_FORMAT: &str = "%a %b %-d %H:%M:%S %Y %z";

/// abbreviated ids shorter than this are never resolved
pub const MIN_PREFIX_LEN: usize = 4;

/// the current local time in commit timestamp format
pub fn now_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// the timestamp carried by the root commit
pub fn epoch_timestamp() -> String {
    DateTime::<Utc>::UNIX_EPOCH.format(TIMESTAMP_FORMAT).to_string()
}

/// the hashed part of a commit
///
/// uses BTreeMap for consistent key ordering, so equal content always
/// serializes to equal bytes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CommitContent {
    message: String,
    timestamp: String,
    parents: Vec<CommitId>,
    tree: Tree,
}

/// on-disk format: the content plus the id computed when it was created
#[derive(Serialize, Deserialize)]
struct CommitRecord {
    id: CommitId,
    #[serde(flatten)]
    content: CommitContent,
}

/// An immutable node in the history graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    id: CommitId,
    content: CommitContent,
}

impl Commit {
    /// build a commit and compute its id
    pub fn new(
        message: impl Into<String>,
        timestamp: impl Into<String>,
        parents: Vec<CommitId>,
        tree: Tree,
    ) -> StorageResult<Self> {
        let content = CommitContent {
            message: message.into(),
            timestamp: timestamp.into(),
            parents,
            tree,
        };
        let bytes = serde_json::to_vec(&content)?;
        let id = CommitId::new(hash_object(ObjectKind::Commit, &bytes));
        Ok(Self { id, content })
    }

    pub fn id(&self) -> CommitId {
        self.id
    }

    pub fn message(&self) -> &str {
        &self.content.message
    }

    pub fn timestamp(&self) -> &str {
        &self.content.timestamp
    }

    pub fn parents(&self) -> &[CommitId] {
        &self.content.parents
    }

    pub fn tree(&self) -> &Tree {
        &self.content.tree
    }

    /// check if this is a merge commit (has multiple parents)
    pub fn is_merge(&self) -> bool {
        self.content.parents.len() > 1
    }

    /// get the first (or only) parent
    pub fn first_parent(&self) -> Option<CommitId> {
        self.content.parents.first().copied()
    }

    /// the blob tracked at `path`, if any
    pub fn blob_at(&self, path: &RepoPath) -> Option<BlobId> {
        self.content.tree.get(path).copied()
    }

    pub fn tracks(&self, path: &RepoPath) -> bool {
        self.content.tree.contains_key(path)
    }
}

impl StoredObject for Commit {
    const KIND: ObjectKind = ObjectKind::Commit;

    fn object_id(&self) -> ObjectId {
        self.id.raw()
    }

    fn encode(&self) -> StorageResult<Vec<u8>> {
        let record = CommitRecord {
            id: self.id,
            content: self.content.clone(),
        };
        Ok(serde_json::to_vec_pretty(&record)?)
    }

    /// validates that the stored id matches the file it was read from
    fn decode(id: ObjectId, bytes: &[u8]) -> StorageResult<Self> {
        let record: CommitRecord = serde_json::from_slice(bytes)?;

        if record.id.raw() != id {
            return Err(StorageError::CorruptedData {
                path: id.to_hex().into(),
                reason: format!(
                    "commit id mismatch: file name says '{}' but record says '{}'",
                    id, record.id
                ),
            });
        }

        Ok(Self {
            id: record.id,
            content: record.content,
        })
    }
}

/// builder for creating commits with a fluent interface
pub struct CommitBuilder<'a> {
    store: &'a ObjectStore,
    tree: Tree,
    parents: Vec<CommitId>,
    message: String,
    timestamp: Option<String>,
}

impl<'a> CommitBuilder<'a> {
    /// create a new CommitBuilder
    pub fn new(store: &'a ObjectStore) -> Self {
        Self {
            store,
            tree: Tree::new(),
            parents: Vec::new(),
            message: String::new(),
            timestamp: None,
        }
    }

    /// set the tree for this commit
    pub fn tree(mut self, tree: Tree) -> Self {
        self.tree = tree;
        self
    }

    /// add a parent commit
    pub fn parent(mut self, parent: CommitId) -> Self {
        self.parents.push(parent);
        self
    }

    /// set multiple parents (for merge commits)
    pub fn parents(mut self, parents: Vec<CommitId>) -> Self {
        self.parents = parents;
        self
    }

    /// set the commit message
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// pin the timestamp instead of using the current time
    pub fn timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// create and store the commit
    pub fn commit(self) -> StorageResult<Commit> {
        let timestamp = self.timestamp.unwrap_or_else(now_timestamp);
        let commit = Commit::new(self.message, timestamp, self.parents, self.tree)?;
        self.store.put(&commit)?;
        debug!(
            commit = %commit.id().short(),
            parents = commit.parents().len(),
            files = commit.tree().len(),
            "created commit"
        );
        Ok(commit)
    }
}

/// get a commit by id
pub fn get_commit(store: &ObjectStore, id: CommitId) -> StorageResult<Commit> {
    store.get(id.raw())
}

/// Resolve a full or abbreviated commit id.
pub fn resolve_commit(store: &ObjectStore, spec: &str) -> StorageResult<CommitId> {
    let spec = spec.trim();
    if spec.len() < MIN_PREFIX_LEN || !spec.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(StorageError::UnknownRevision(spec.to_string()));
    }

    let mut matches = store.ids_with_prefix(ObjectKind::Commit, spec)?;
    match matches.len() {
        0 => Err(StorageError::UnknownRevision(spec.to_string())),
        1 => Ok(CommitId::new(matches.remove(0))),
        n => Err(StorageError::AmbiguousRevision {
            prefix: spec.to_string(),
            matches: n,
        }),
    }
}

/// every commit in the store, in id order
pub fn all_commits(store: &ObjectStore) -> StorageResult<Vec<Commit>> {
    store
        .ids(ObjectKind::Commit)?
        .into_iter()
        .map(|id| store.get(id))
        .collect()
}

/// first-parent walk from a commit back to the root
pub struct HistoryIterator<'a> {
    store: &'a ObjectStore,
    next: Option<CommitId>,
}

impl<'a> HistoryIterator<'a> {
    /// create a new history iterator; the start commit is yielded first
    pub fn new(store: &'a ObjectStore, start: CommitId) -> Self {
        Self {
            store,
            next: Some(start),
        }
    }
}

impl<'a> Iterator for HistoryIterator<'a> {
    type Item = StorageResult<Commit>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next.take()?;
        match get_commit(self.store, id) {
            Ok(commit) => {
                self.next = commit.first_parent();
                Some(Ok(commit))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

/// get first-parent history for a commit
pub fn history(store: &ObjectStore, start: CommitId) -> HistoryIterator<'_> {
    HistoryIterator::new(store, start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::blob::Blob;
    use tempfile::TempDir;

    fn setup_store() -> (TempDir, ObjectStore) {
        let dir = TempDir::new().unwrap();
        let store = ObjectStore::create(dir.path()).unwrap();
        (dir, store)
    }

    fn tree_with(store: &ObjectStore, name: &str, contents: &[u8]) -> Tree {
        let blob = Blob::new(contents.to_vec());
        store.put(&blob).unwrap();
        let mut tree = Tree::new();
        tree.insert(RepoPath::new(name).unwrap(), blob.id());
        tree
    }

    fn root_commit(store: &ObjectStore) -> Commit {
        CommitBuilder::new(store)
            .message("initial commit")
            .timestamp(epoch_timestamp())
            .commit()
            .unwrap()
    }

    #[test]
    fn test_root_commit() {
        let (_dir, store) = setup_store();
        let root = root_commit(&store);

        let info = get_commit(&store, root.id()).unwrap();
        assert_eq!(info.message(), "initial commit");
        assert!(info.parents().is_empty());
        assert!(info.tree().is_empty());
        assert_eq!(info.timestamp(), "Thu Jan 1 00:00:00 1970 +0000");
    }

    #[test]
    fn test_commit_builder() {
        let (_dir, store) = setup_store();
        let root = root_commit(&store);

        let second = CommitBuilder::new(&store)
            .tree(tree_with(&store, "f", b"a"))
            .parent(root.id())
            .message("second commit")
            .commit()
            .unwrap();

        let info = get_commit(&store, second.id()).unwrap();
        assert_eq!(info.parents(), &[root.id()]);
        assert_eq!(info.first_parent(), Some(root.id()));
        assert!(!info.is_merge());
        assert_eq!(
            info.blob_at(&RepoPath::new("f").unwrap()),
            Some(Blob::new(b"a".to_vec()).id())
        );
    }

    #[test]
    fn test_hash_is_stable() {
        let a = Commit::new("m", "t", Vec::new(), Tree::new()).unwrap();
        let b = Commit::new("m", "t", Vec::new(), Tree::new()).unwrap();
        let c = Commit::new("other", "t", Vec::new(), Tree::new()).unwrap();
        assert_eq!(a.id(), b.id());
        assert_ne!(a.id(), c.id());
    }

    #[test]
    fn test_stored_id_is_not_recomputed() {
        let (_dir, store) = setup_store();
        let root = root_commit(&store);
        let reread = get_commit(&store, root.id()).unwrap();
        assert_eq!(reread, root);
    }

    #[test]
    fn test_decode_rejects_mismatched_id() {
        let commit = Commit::new("m", "t", Vec::new(), Tree::new()).unwrap();
        let bytes = commit.encode().unwrap();
        let other = Commit::new("x", "t", Vec::new(), Tree::new()).unwrap();

        let result = Commit::decode(other.object_id(), &bytes);
        assert!(matches!(result, Err(StorageError::CorruptedData { .. })));
    }

    #[test]
    fn test_history_iteration() {
        let (_dir, store) = setup_store();
        let a = root_commit(&store);
        let b = CommitBuilder::new(&store).parent(a.id()).message("B").commit().unwrap();
        let c = CommitBuilder::new(&store).parent(b.id()).message("C").commit().unwrap();

        let ids: Vec<CommitId> = history(&store, c.id())
            .map(|r| r.map(|commit| commit.id()))
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(ids, vec![c.id(), b.id(), a.id()]);
    }

    #[test]
    fn test_history_follows_first_parent_only() {
        let (_dir, store) = setup_store();
        let root = root_commit(&store);
        let side = CommitBuilder::new(&store).parent(root.id()).message("side").commit().unwrap();
        let main = CommitBuilder::new(&store).parent(root.id()).message("main").commit().unwrap();
        let merge = CommitBuilder::new(&store)
            .parents(vec![main.id(), side.id()])
            .message("merge")
            .commit()
            .unwrap();

        assert!(merge.is_merge());
        let messages: Vec<String> = history(&store, merge.id())
            .map(|r| r.unwrap().message().to_string())
            .collect();
        assert_eq!(messages, vec!["merge", "main", "initial commit"]);
    }

    #[test]
    fn test_all_commits() {
        let (_dir, store) = setup_store();
        let a = root_commit(&store);
        let b = CommitBuilder::new(&store).parent(a.id()).message("B").commit().unwrap();
        // blobs are not commits
        store.put(&Blob::new(b"data".to_vec())).unwrap();

        let mut ids: Vec<CommitId> = all_commits(&store).unwrap().iter().map(Commit::id).collect();
        ids.sort();
        let mut expected = vec![a.id(), b.id()];
        expected.sort();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_resolve_commit() {
        let (_dir, store) = setup_store();
        let root = root_commit(&store);
        let hex = root.id().to_string();

        assert_eq!(resolve_commit(&store, &hex).unwrap(), root.id());
        assert_eq!(resolve_commit(&store, &hex[..8]).unwrap(), root.id());
        assert!(matches!(
            resolve_commit(&store, &hex[..3]),
            Err(StorageError::UnknownRevision(_))
        ));
        assert!(matches!(
            resolve_commit(&store, "zzzzzz"),
            Err(StorageError::UnknownRevision(_))
        ));
    }

    #[test]
    fn test_resolve_commit_ambiguous() {
        let (_dir, store) = setup_store();
        let dir = store.root().join(ObjectKind::Commit.dir_name());
        let first = format!("abcd{}", "0".repeat(60));
        let second = format!("abcd{}", "1".repeat(60));
        std::fs::write(dir.join(&first), b"{}").unwrap();
        std::fs::write(dir.join(&second), b"{}").unwrap();

        match resolve_commit(&store, "abcd") {
            Err(StorageError::AmbiguousRevision { prefix, matches }) => {
                assert_eq!(prefix, "abcd");
                assert_eq!(matches, 2);
            }
            other => panic!("expected an ambiguous revision, got {:?}", other),
        }
        // one more character disambiguates, in either case
        assert_eq!(resolve_commit(&store, "ABCD0").unwrap().to_string(), first);
        assert_eq!(resolve_commit(&store, "abcd1").unwrap().to_string(), second);
    }

    #[test]
    fn test_resolve_commit_missing() {
        let (_dir, store) = setup_store();
        root_commit(&store);
        let result = resolve_commit(&store, &"0".repeat(64));
        assert!(result.unwrap_err().is_not_found());
    }
}
