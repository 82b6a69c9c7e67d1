//! Repository session layer.
//!
//! Ties the storage, working tree and merge layers together behind one
//! [`Repository`] value. Each public method is one user-level operation;
//! its checks run before anything on disk is changed.

mod api;
mod config;
mod error;
mod report;

pub use api::Repository;
pub use config::{RepoLayout, RepositoryConfig, WORK_DIR_ENV};
pub use error::{BranchOp, RepoError, RepoResult};
pub use report::{LogEntry, StatusReport};
