//! Durable key-value boundary the store persists through.
//!
//! The store serializes its whole state as one JSON payload and writes it
//! under a single fixed key; everything about *where* that payload lives is
//! behind [`StorageBackend`] so tests and ephemeral sessions can swap in an
//! in-memory implementation.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use thiserror::Error;

/// Key the store snapshot is written under.
pub const STATE_KEY: &str = "tally-app-state";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read '{key}': {source}")]
    Read {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write '{key}': {source}")]
    Write {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

/// Synchronous key-value persistence. Values are opaque strings; callers own
/// serialization. Reads distinguish "absent" from failure.
pub trait StorageBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<S: StorageBackend + ?Sized> StorageBackend for std::sync::Arc<S> {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(key, value)
    }
}

/// File-per-key storage rooted at the app data directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StorageBackend for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StorageError::Read {
                key: key.to_string(),
                source: err,
            }),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        // Write to a sibling temp file and rename so a crash mid-write never
        // leaves a truncated snapshot behind.
        let wrap = |source| StorageError::Write {
            key: key.to_string(),
            source,
        };
        let path = self.path_for(key);
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        fs::write(&tmp, value).map_err(wrap)?;
        fs::rename(&tmp, &path).map_err(wrap)?;
        Ok(())
    }
}

/// In-process storage for tests and sessions that opt out of persistence.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn file_storage_reads_back_what_it_wrote() {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::new(temp.path().to_path_buf());

        assert!(storage.read(STATE_KEY).unwrap().is_none());

        storage.write(STATE_KEY, "{\"tasks\":[]}").unwrap();
        assert_eq!(
            storage.read(STATE_KEY).unwrap().as_deref(),
            Some("{\"tasks\":[]}")
        );
        assert!(temp.path().join("tally-app-state.json").exists());
    }

    #[test]
    fn file_storage_overwrites_in_place() {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::new(temp.path().to_path_buf());

        storage.write(STATE_KEY, "one").unwrap();
        storage.write(STATE_KEY, "two").unwrap();
        assert_eq!(storage.read(STATE_KEY).unwrap().as_deref(), Some("two"));
        // The temp file from the rename dance must not linger.
        assert!(!temp.path().join("tally-app-state.json.tmp").exists());
    }

    #[test]
    fn file_storage_write_fails_on_missing_dir() {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::new(temp.path().join("not-created"));

        let err = storage.write(STATE_KEY, "x").unwrap_err();
        assert!(matches!(err, StorageError::Write { .. }));
    }

    #[test]
    fn memory_storage_round_trips() {
        let storage = MemoryStorage::new();
        assert!(storage.read("k").unwrap().is_none());
        storage.write("k", "v").unwrap();
        assert_eq!(storage.read("k").unwrap().as_deref(), Some("v"));
    }
}
