//! Crash-safe file replacement for metadata records and objects.
//!
//! Data goes to a temporary file in the target's directory, is flushed,
//! and is then renamed over the target. Readers see either the old record
//! or the new one, never a torn write.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::storage::error::{StorageError, StorageResult};

/// atomically replace `target` with `data`
pub fn write_atomic(target: &Path, data: &[u8]) -> StorageResult<()> {
    let dir = target.parent().ok_or_else(|| StorageError::CorruptedData {
        path: target.to_path_buf(),
        reason: "no parent directory".to_string(),
    })?;

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(data)?;
    file.as_file().sync_all()?;
    file.persist(target).map_err(|e| StorageError::Persist {
        path: target.to_path_buf(),
        source: e.error,
    })?;

    Ok(())
}

/// serialize `value` as pretty JSON and atomically write it to `target`
pub fn write_json<T: Serialize>(target: &Path, value: &T) -> StorageResult<()> {
    let bytes = serde_json::to_vec_pretty(value)?;
    write_atomic(target, &bytes)
}

/// read a JSON record written by [`write_json`]
pub fn read_json<T: DeserializeOwned>(path: &Path) -> StorageResult<T> {
    let bytes = fs::read(path)?;
    serde_json::from_slice(&bytes).map_err(|e| StorageError::CorruptedData {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
