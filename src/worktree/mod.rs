//! The working tree: the user's files next to the metadata directory.
//!
//! Working trees are flat. Only plain files directly inside the root are
//! considered; subdirectories (including the metadata directory) are ignored.

mod error;
mod status;
mod sync;

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::storage::{Blob, RepoPath};

pub use error::{WorktreeError, WorktreeResult};
pub use status::{scan_status, WorktreeStatus};
pub use sync::{
    checkout_path, guard_untracked, guard_untracked_overwrite, materialize, untracked_files,
};

/// Filesystem access to the working directory.
#[derive(Debug, Clone)]
pub struct WorkingTree {
    root: PathBuf,
}

impl WorkingTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file_path(&self, path: &RepoPath) -> PathBuf {
        self.root.join(path.as_str())
    }

    /// List plain files in the root, sorted.
    ///
    /// Names that are not valid repository paths (or not UTF-8) are skipped.
    pub fn list_files(&self) -> WorktreeResult<Vec<RepoPath>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => match RepoPath::new(name) {
                    Ok(path) => files.push(path),
                    Err(e) => trace!(error = %e, "skipping unsupported file name"),
                },
                Err(name) => trace!(?name, "skipping non-utf8 file name"),
            }
        }
        files.sort();
        Ok(files)
    }

    pub fn exists(&self, path: &RepoPath) -> bool {
        self.file_path(path).is_file()
    }

    /// Read a file, or `None` if it is not there.
    pub fn read(&self, path: &RepoPath) -> WorktreeResult<Option<Vec<u8>>> {
        match fs::read(self.file_path(path)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Snapshot a file as a blob, or `None` if it is not there.
    pub fn blob(&self, path: &RepoPath) -> WorktreeResult<Option<Blob>> {
        Ok(self.read(path)?.map(Blob::new))
    }

    /// Create or overwrite a file.
    pub fn write(&self, path: &RepoPath, contents: &[u8]) -> WorktreeResult<()> {
        trace!(%path, bytes = contents.len(), "writing working file");
        fs::write(self.file_path(path), contents)?;
        Ok(())
    }

    /// Delete a file. Missing files are ignored.
    pub fn remove(&self, path: &RepoPath) -> WorktreeResult<()> {
        match fs::remove_file(self.file_path(path)) {
            Ok(()) => {
                trace!(%path, "removed working file");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn path(name: &str) -> RepoPath {
        RepoPath::new(name).unwrap()
    }

    #[test]
    fn test_list_files_skips_directories() {
        let dir = TempDir::new().unwrap();
        let tree = WorkingTree::new(dir.path());
        fs::create_dir(dir.path().join(".gitlite")).unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("b.txt"), b"b").unwrap();
        fs::write(dir.path().join("a.txt"), b"a").unwrap();

        assert_eq!(tree.list_files().unwrap(), vec![path("a.txt"), path("b.txt")]);
    }

    #[test]
    fn test_read_write_remove() {
        let dir = TempDir::new().unwrap();
        let tree = WorkingTree::new(dir.path());
        let f = path("f");

        assert_eq!(tree.read(&f).unwrap(), None);
        tree.write(&f, b"contents").unwrap();
        assert!(tree.exists(&f));
        assert_eq!(tree.read(&f).unwrap(), Some(b"contents".to_vec()));
        assert_eq!(tree.blob(&f).unwrap().unwrap().id(), Blob::new(b"contents".to_vec()).id());

        tree.remove(&f).unwrap();
        assert!(!tree.exists(&f));
        tree.remove(&f).unwrap();
    }
}
