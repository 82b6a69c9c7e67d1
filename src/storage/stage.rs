//! The staging area (index): changes queued for the next commit.
//!
//! Every staged path maps to exactly one [`StagedChange`], so a path can
//! never be pending addition and removal at the same time. Content staged
//! for addition is copied into a scratch object store next to the index so
//! it survives until the commit that promotes it.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::storage::blob::Blob;
use crate::storage::commit::Tree;
use crate::storage::error::StorageResult;
use crate::storage::object::ObjectStore;
use crate::storage::persist::{read_json, write_json};
use crate::storage::types::{BlobId, ObjectKind, RepoPath};

/// a pending change to one path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StagedChange {
    Added(BlobId),
    Removed,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct IndexRecord {
    entries: BTreeMap<RepoPath, StagedChange>,
}

/// The staging area of a repository session.
#[derive(Debug)]
pub struct StagingArea {
    path: PathBuf,
    blobs: ObjectStore,
    entries: BTreeMap<RepoPath, StagedChange>,
}

impl StagingArea {
    /// An empty index at `path` whose staged blobs live in `blobs`.
    pub fn create(path: impl Into<PathBuf>, blobs: ObjectStore) -> Self {
        Self {
            path: path.into(),
            blobs,
            entries: BTreeMap::new(),
        }
    }

    /// Load a saved index.
    pub fn load(path: impl Into<PathBuf>, blobs: ObjectStore) -> StorageResult<Self> {
        let path = path.into();
        let record: IndexRecord = read_json(&path)?;
        Ok(Self {
            path,
            blobs,
            entries: record.entries,
        })
    }

    /// Persist the index.
    pub fn save(&self) -> StorageResult<()> {
        let record = IndexRecord {
            entries: self.entries.clone(),
        };
        write_json(&self.path, &record)
    }

    /// the scratch store holding staged blob copies
    pub fn blob_store(&self) -> &ObjectStore {
        &self.blobs
    }

    pub fn get(&self, path: &RepoPath) -> Option<StagedChange> {
        self.entries.get(path).copied()
    }

    /// the blob staged for addition at `path`, if any
    pub fn added(&self, path: &RepoPath) -> Option<BlobId> {
        match self.entries.get(path) {
            Some(StagedChange::Added(id)) => Some(*id),
            _ => None,
        }
    }

    pub fn is_removed(&self, path: &RepoPath) -> bool {
        matches!(self.entries.get(path), Some(StagedChange::Removed))
    }

    pub fn contains(&self, path: &RepoPath) -> bool {
        self.entries.contains_key(path)
    }

    /// true when committing now would change nothing
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&RepoPath, &StagedChange)> {
        self.entries.iter()
    }

    /// paths staged for addition, with their blobs, in path order
    pub fn additions(&self) -> impl Iterator<Item = (&RepoPath, BlobId)> {
        self.entries.iter().filter_map(|(path, change)| match change {
            StagedChange::Added(id) => Some((path, *id)),
            StagedChange::Removed => None,
        })
    }

    /// paths staged for removal, in path order
    pub fn removals(&self) -> impl Iterator<Item = &RepoPath> {
        self.entries
            .iter()
            .filter(|(_, change)| matches!(change, StagedChange::Removed))
            .map(|(path, _)| path)
    }

    /// Stage `blob` as the new contents of `path`.
    ///
    /// Replaces any earlier addition or removal of the same path.
    pub fn stage_addition(&mut self, path: RepoPath, blob: &Blob) -> StorageResult<()> {
        self.blobs.put(blob)?;
        debug!(%path, blob = %blob.id().raw().short(), "staged addition");
        let previous = self.entries.insert(path, StagedChange::Added(blob.id()));
        if let Some(StagedChange::Added(old)) = previous {
            self.release(old)?;
        }
        Ok(())
    }

    /// Stage `path` for removal, dropping any pending addition.
    pub fn stage_removal(&mut self, path: RepoPath) -> StorageResult<()> {
        debug!(%path, "staged removal");
        if let Some(StagedChange::Added(old)) = self.entries.insert(path, StagedChange::Removed) {
            self.release(old)?;
        }
        Ok(())
    }

    /// Forget whatever is staged for `path`. Returns the dropped change.
    pub fn unstage(&mut self, path: &RepoPath) -> StorageResult<Option<StagedChange>> {
        let previous = self.entries.remove(path);
        if let Some(StagedChange::Added(old)) = previous {
            self.release(old)?;
        }
        if previous.is_some() {
            debug!(%path, "unstaged");
        }
        Ok(previous)
    }

    /// Empty the index and delete every staged blob copy.
    pub fn clear(&mut self) -> StorageResult<()> {
        self.entries.clear();
        for id in self.blobs.ids(ObjectKind::Blob)? {
            self.blobs.delete(ObjectKind::Blob, id)?;
        }
        debug!("cleared staging area");
        Ok(())
    }

    /// read a blob staged in this area
    pub fn staged_blob(&self, id: BlobId) -> StorageResult<Blob> {
        self.blobs.get(id.raw())
    }

    /// Copy every staged blob into the permanent store.
    pub fn promote(&self, objects: &ObjectStore) -> StorageResult<()> {
        for (_, id) in self.additions() {
            self.blobs.copy_to::<Blob>(id.raw(), objects)?;
        }
        Ok(())
    }

    /// `base` with the staged changes applied
    pub fn apply_to(&self, base: &Tree) -> Tree {
        let mut tree = base.clone();
        for (path, change) in &self.entries {
            match change {
                StagedChange::Added(id) => {
                    tree.insert(path.clone(), *id);
                }
                StagedChange::Removed => {
                    tree.remove(path);
                }
            }
        }
        tree
    }

    /// drop a staged blob copy once no entry refers to it
    fn release(&self, id: BlobId) -> StorageResult<()> {
        let still_used = self
            .entries
            .values()
            .any(|change| *change == StagedChange::Added(id));
        if !still_used {
            self.blobs.delete(ObjectKind::Blob, id.raw())?;
        }
        Ok(())
    }
}
