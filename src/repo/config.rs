//! Repository configuration and on-disk layout.

use std::path::{Path, PathBuf};

use crate::storage::{BranchName, InvalidNameError};

/// environment variable overriding the working directory
pub const WORK_DIR_ENV: &str = "GITLITE_DIR";

/// Repository configuration options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryConfig {
    /// Directory holding the tracked files.
    pub work_dir: PathBuf,
    /// Name of the metadata directory inside `work_dir`.
    pub meta_dir_name: String,
    /// Branch created by `init`.
    pub default_branch: BranchName,
    /// Message of the root commit.
    pub initial_message: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("."),
            meta_dir_name: ".gitlite".into(),
            default_branch: BranchName::default(),
            initial_message: "initial commit".into(),
        }
    }
}

impl RepositoryConfig {
    /// Create a new configuration for the given working directory.
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            ..Default::default()
        }
    }

    /// Configuration for the process: `GITLITE_DIR` if set, otherwise the
    /// current directory.
    pub fn from_env() -> Self {
        match std::env::var_os(WORK_DIR_ENV) {
            Some(dir) if !dir.is_empty() => Self::new(dir),
            _ => Self::default(),
        }
    }

    /// Set the working directory.
    pub fn work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    /// Set the metadata directory name.
    pub fn meta_dir_name(mut self, name: impl Into<String>) -> Self {
        self.meta_dir_name = name.into();
        self
    }

    /// Set the default branch name.
    pub fn default_branch(mut self, name: impl Into<String>) -> Result<Self, InvalidNameError> {
        self.default_branch = BranchName::new(name)?;
        Ok(self)
    }

    /// Set the root commit's message.
    pub fn initial_message(mut self, message: impl Into<String>) -> Self {
        self.initial_message = message.into();
        self
    }

    pub fn layout(&self) -> RepoLayout {
        RepoLayout::new(self.work_dir.join(&self.meta_dir_name))
    }
}

/// Paths of everything under the metadata directory.
///
/// ```text
/// .gitlite/
///   objects/blobs/<id>
///   objects/commits/<id>
///   staging/blobs/<id>
///   index.json
///   refs.json
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoLayout {
    root: PathBuf,
}

impl RepoLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn objects_dir(&self) -> PathBuf {
        self.root.join("objects")
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.root.join("staging")
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join("index.json")
    }

    pub fn refs_path(&self) -> PathBuf {
        self.root.join("refs.json")
    }

    pub fn exists(&self) -> bool {
        self.root.is_dir()
    }
}
