//!  Blob objects: one file's contents at one point in time.
//!
//! Blobs are stored raw, with no framing, so the file under
//! `objects/blobs/<id>` is byte-for-byte the tracked file.

use crate::storage::error::StorageResult;
use crate::storage::hash::hash_object;
use crate::storage::object::StoredObject;
use crate::storage::types::{BlobId, ObjectId, ObjectKind};

/// an immutable snapshot of a file's contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    id: BlobId,
    contents: Vec<u8>,
}

impl Blob {
    /// create a blob, computing its id from the contents
    pub fn new(contents: Vec<u8>) -> Self {
        let id = BlobId::new(hash_object(ObjectKind::Blob, &contents));
        Self { id, contents }
    }

    pub fn id(&self) -> BlobId {
        self.id
    }

    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    pub fn into_contents(self) -> Vec<u8> {
        self.contents
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }
}

impl StoredObject for Blob {
    const KIND: ObjectKind = ObjectKind::Blob;

    fn object_id(&self) -> ObjectId {
        self.id.raw()
    }

    fn encode(&self) -> StorageResult<Vec<u8>> {
        Ok(self.contents.clone())
    }

    /// trusts the file name; the id is not recomputed on read
    fn decode(id: ObjectId, bytes: &[u8]) -> StorageResult<Self> {
        Ok(Self {
            id: BlobId::new(id),
            contents: bytes.to_vec(),
        })
    }
}
