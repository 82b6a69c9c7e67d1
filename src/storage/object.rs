//! Content-addressed object storage.
//!
//! Objects live in one file each, named by their hex id and grouped in one
//! subdirectory per kind:
//!
//! ```text
//! <root>/
//!   blobs/<id>
//!   commits/<id>
//! ```
//!
//! The same store type backs both the permanent object area and the
//! staging area's scratch copies; only the root differs.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::persist::write_atomic;
use crate::storage::types::{ObjectId, ObjectKind};

/// An immutable value that can be written to an [`ObjectStore`].
///
/// The id is computed once, when the value is constructed, and carried with
/// it. The store never recomputes it.
pub trait StoredObject: Sized {
    const KIND: ObjectKind;

    /// the content hash assigned at construction
    fn object_id(&self) -> ObjectId;

    /// bytes written to disk
    fn encode(&self) -> StorageResult<Vec<u8>>;

    /// rebuild the object read from the file named `id`
    fn decode(id: ObjectId, bytes: &[u8]) -> StorageResult<Self>;
}

/// A directory of content-addressed objects.
#[derive(Debug, Clone)]
pub struct ObjectStore {
    root: PathBuf,
}

impl ObjectStore {
    /// Open a store rooted at `root` without touching the filesystem.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the store's directory layout.
    pub fn create(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let store = Self::open(root);
        for kind in [ObjectKind::Blob, ObjectKind::Commit] {
            fs::create_dir_all(store.kind_dir(kind))?;
        }
        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn kind_dir(&self, kind: ObjectKind) -> PathBuf {
        self.root.join(kind.dir_name())
    }

    fn object_path(&self, kind: ObjectKind, id: ObjectId) -> PathBuf {
        self.kind_dir(kind).join(id.to_hex())
    }

    /// Store an object and return its id.
    ///
    /// Storing content that is already present is a no-op.
    pub fn put<T: StoredObject>(&self, object: &T) -> StorageResult<ObjectId> {
        let id = object.object_id();
        let path = self.object_path(T::KIND, id);
        if path.exists() {
            trace!(kind = %T::KIND, %id, "object already stored");
            return Ok(id);
        }

        fs::create_dir_all(self.kind_dir(T::KIND))?;
        write_atomic(&path, &object.encode()?)?;
        debug!(kind = %T::KIND, id = %id.short(), store = %self.root.display(), "stored object");
        Ok(id)
    }

    /// Read an object back.
    pub fn get<T: StoredObject>(&self, id: ObjectId) -> StorageResult<T> {
        let path = self.object_path(T::KIND, id);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::ObjectNotFound { kind: T::KIND, id });
            }
            Err(e) => return Err(e.into()),
        };
        T::decode(id, &bytes)
    }

    /// check whether an object of `kind` with `id` is stored
    pub fn contains(&self, kind: ObjectKind, id: ObjectId) -> bool {
        self.object_path(kind, id).is_file()
    }

    /// Remove an object. Missing objects are ignored.
    ///
    /// Only used for scratch copies in the staging area; committed history
    /// is never deleted.
    pub fn delete(&self, kind: ObjectKind, id: ObjectId) -> StorageResult<()> {
        match fs::remove_file(self.object_path(kind, id)) {
            Ok(()) => {
                debug!(%kind, id = %id.short(), store = %self.root.display(), "deleted object");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// List the ids of every object of `kind`, sorted.
    ///
    /// Files whose names are not object ids are skipped.
    pub fn ids(&self, kind: ObjectKind) -> StorageResult<Vec<ObjectId>> {
        let dir = self.kind_dir(kind);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(id) = entry.file_name().to_str().and_then(|n| ObjectId::from_hex(n).ok()) {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Find every id of `kind` whose hex form starts with `prefix`.
    pub fn ids_with_prefix(&self, kind: ObjectKind, prefix: &str) -> StorageResult<Vec<ObjectId>> {
        let prefix = prefix.to_ascii_lowercase();
        Ok(self
            .ids(kind)?
            .into_iter()
            .filter(|id| id.to_hex().starts_with(&prefix))
            .collect())
    }

    /// Copy one object into another store, e.g. promoting a staged blob.
    pub fn copy_to<T: StoredObject>(&self, id: ObjectId, other: &ObjectStore) -> StorageResult<()> {
        if other.contains(T::KIND, id) {
            return Ok(());
        }
        let object: T = self.get(id)?;
        other.put(&object)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::blob::Blob;
    use tempfile::TempDir;

    fn setup_store() -> (TempDir, ObjectStore) {
        let dir = TempDir::new().unwrap();
        let store = ObjectStore::create(dir.path().join("objects")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_put_get() {
        let (_dir, store) = setup_store();
        let blob = Blob::new(b"hello world".to_vec());

        let id = store.put(&blob).unwrap();
        assert_eq!(id, blob.id().raw());

        let back: Blob = store.get(id).unwrap();
        assert_eq!(back, blob);
    }

    #[test]
    fn test_put_is_idempotent() {
        let (_dir, store) = setup_store();
        let first = store.put(&Blob::new(b"same".to_vec())).unwrap();
        let second = store.put(&Blob::new(b"same".to_vec())).unwrap();

        assert_eq!(first, second);
        assert_eq!(store.ids(ObjectKind::Blob).unwrap().len(), 1);
    }

    #[test]
    fn test_get_missing() {
        let (_dir, store) = setup_store();
        let missing = Blob::new(b"never stored".to_vec()).id().raw();

        let result: StorageResult<Blob> = store.get(missing);
        assert!(matches!(result, Err(StorageError::ObjectNotFound { kind: ObjectKind::Blob, .. })));
    }

    #[test]
    fn test_delete() {
        let (_dir, store) = setup_store();
        let id = store.put(&Blob::new(b"scratch".to_vec())).unwrap();
        assert!(store.contains(ObjectKind::Blob, id));

        store.delete(ObjectKind::Blob, id).unwrap();
        assert!(!store.contains(ObjectKind::Blob, id));

        // deleting twice is fine
        store.delete(ObjectKind::Blob, id).unwrap();
    }

    #[test]
    fn test_ids_skip_foreign_files() {
        let (_dir, store) = setup_store();
        store.put(&Blob::new(b"one".to_vec())).unwrap();
        fs::write(store.root().join("blobs").join("README"), b"not an object").unwrap();

        assert_eq!(store.ids(ObjectKind::Blob).unwrap().len(), 1);
        assert!(store.ids(ObjectKind::Commit).unwrap().is_empty());
    }

    #[test]
    fn test_prefix_lookup() {
        let (_dir, store) = setup_store();
        let id = store.put(&Blob::new(b"prefix".to_vec())).unwrap();
        let hex = id.to_hex();

        assert_eq!(store.ids_with_prefix(ObjectKind::Blob, &hex[..6]).unwrap(), vec![id]);
        assert_eq!(
            store.ids_with_prefix(ObjectKind::Blob, &hex[..6].to_uppercase()).unwrap(),
            vec![id]
        );
    }

    #[test]
    fn test_copy_to() {
        let (dir, staging) = setup_store();
        let objects = ObjectStore::create(dir.path().join("other")).unwrap();
        let id = staging.put(&Blob::new(b"promote me".to_vec())).unwrap();

        staging.copy_to::<Blob>(id, &objects).unwrap();
        assert!(objects.contains(ObjectKind::Blob, id));
    }
}
