//! gitlite - a small content-addressed version control system
//!
//! Files are snapshotted into immutable, SHA-256 addressed blobs; commits
//! record a tree of file name to blob plus their parents, and branches are
//! named pointers into the resulting graph. Everything lives under a
//! `.gitlite/` directory next to the tracked files.
//!
//! # Example
//!
//! ```no_run
//! use gitlite::repo::{Repository, RepositoryConfig};
//!
//! let mut repo = Repository::init(RepositoryConfig::new("./project")).unwrap();
//! std::fs::write("./project/notes.txt", "hello").unwrap();
//! repo.add("notes.txt").unwrap();
//! repo.commit("add notes").unwrap();
//! for entry in repo.log().unwrap() {
//!     println!("{}", entry);
//! }
//! ```

pub mod command;
pub mod logging;
pub mod merge;
pub mod repo;
pub mod storage;
pub mod worktree;
