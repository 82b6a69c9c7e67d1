//! SHA-256 content hashing for stored objects.
//!
//! The hash covers a kind tag and the payload length as well as the payload
//! itself, so a blob whose bytes happen to equal a serialized commit still
//! gets a different id.

use sha2::{Digest, Sha256};

use crate::storage::types::{ObjectId, ObjectKind};

/// hash an object payload of the given kind
pub fn hash_object(kind: ObjectKind, payload: &[u8]) -> ObjectId {
    let mut hasher = Sha256::new();
    hasher.update(kind.tag().as_bytes());
    hasher.update(b" ");
    hasher.update(payload.len().to_string().as_bytes());
    hasher.update([0u8]);
    hasher.update(payload);
    ObjectId::from_bytes(hasher.finalize().into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_stable() {
        let a = hash_object(ObjectKind::Blob, b"hello");
        let b = hash_object(ObjectKind::Blob, b"hello");
        assert_eq!(a, b);
    }

    #[test]
    fn test_hash_known_value() {
        // sha256("blob 5\0hello")
        let mut hasher = Sha256::new();
        hasher.update(b"blob 5\0hello");
        let expected = hex::encode(hasher.finalize());
        assert_eq!(hash_object(ObjectKind::Blob, b"hello").to_hex(), expected);
    }

    #[test]
    fn test_kind_separates_ids() {
        let blob = hash_object(ObjectKind::Blob, b"{}");
        let commit = hash_object(ObjectKind::Commit, b"{}");
        assert_ne!(blob, commit);
    }

    #[test]
    fn test_different_content_different_hash() {
        assert_ne!(
            hash_object(ObjectKind::Blob, b"a"),
            hash_object(ObjectKind::Blob, b"b")
        );
    }
}
