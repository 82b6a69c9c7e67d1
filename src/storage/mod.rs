//! storage layer for gitlite
//!
//! this module owns everything that lives under the metadata directory.
//! The upper layers (working tree sync, merge engine, repository session)
//! use this API and never touch those files directly.
//!
//!  # Architecture
//!
//! ```text
//!  ┌─────────────┐       ┌─────────────┐       ┌─────────────┐
//!  │    refs     │       │    stage    │       │   commit    │
//!  │ (HEAD,      │       │  (index)    │       │  (history)  │
//!  │  branches)  │       │             │       │             │
//!  └─────────────┘       └─────────────┘       └─────────────┘
//!         │                     │                     │
//!         │                     └──────────┬──────────┘
//!         │                                ▼
//!         │                         ┌─────────────┐
//!         │                         │   object    │
//!         │                         │ (blobs and  │
//!         │                         │  commits)   │
//!         │                         └─────────────┘
//!         │                                │
//!         └────────────────┬───────────────┘
//!                          ▼
//!                   ┌─────────────┐
//!                   │   persist   │
//!                   │  (atomic    │
//!                   │   writes)   │
//!                   └─────────────┘
//!  ```
//!
//! # Usage
//!
//! ```ignore
//! use gitlite::storage::{Blob, CommitBuilder, ObjectStore, RepoPath, Tree};
//!
//! let store = ObjectStore::create(".gitlite/objects")?;
//! let blob = Blob::new(b"hello".to_vec());
//! store.put(&blob)?;
//!
//! let mut tree = Tree::new();
//! tree.insert(RepoPath::new("hello.txt")?, blob.id());
//! let commit = CommitBuilder::new(&store).tree(tree).message("hello").commit()?;
//! ```

mod blob;
mod commit;
mod error;
mod hash;
mod object;
mod persist;
mod refs;
mod stage;
mod types;

// Re-export public API
pub use blob::Blob;
pub use commit::{
    all_commits, epoch_timestamp, get_commit, history, now_timestamp, resolve_commit, Commit,
    CommitBuilder, HistoryIterator, Tree, MIN_PREFIX_LEN, TIMESTAMP_FORMAT,
};
pub use error::{StorageError, StorageResult};
pub use hash::hash_object;
pub use object::{ObjectStore, StoredObject};
pub use refs::RefManager;
pub use stage::{StagedChange, StagingArea};
pub use types::{
    BlobId, BranchName, CommitId, InvalidIdError, InvalidNameError, ObjectId, ObjectKind,
    RepoPath, SHORT_ID_LEN,
};
