//! Durable storage for the session record.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;

/// Fixed name of the persisted session record.
pub const SESSION_RECORD_NAME: &str = "storefront.session.json";

#[derive(Debug, Error)]
pub enum SessionStorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode session record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Holds at most one serialized session record.
///
/// Calls are synchronous; the record is small and read or written inline with the
/// flow that needs it.
pub trait SessionStorage: Send + Sync {
    /// Returns the raw record, or `None` when nothing is stored.
    fn load(&self) -> Result<Option<String>, SessionStorageError>;

    /// Replaces the stored record.
    fn save(&self, record: &str) -> Result<(), SessionStorageError>;

    /// Deletes the stored record. Deleting a missing record succeeds.
    fn remove(&self) -> Result<(), SessionStorageError>;
}

/// Stores the record as a file inside a state directory.
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    /// Uses `<dir>/storefront.session.json`. The directory is created on first save.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(SESSION_RECORD_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> SessionStorageError {
        SessionStorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SessionStorage for FileSessionStorage {
    fn load(&self) -> Result<Option<String>, SessionStorageError> {
        match fs::read_to_string(&self.path) {
            Ok(record) => Ok(Some(record)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn save(&self, record: &str) -> Result<(), SessionStorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        // Write then rename so a crash never leaves a half-written record.
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, record).map_err(|e| self.io_error(e))?;
        fs::rename(&staging, &self.path).map_err(|e| self.io_error(e))
    }

    fn remove(&self) -> Result<(), SessionStorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

/// In-memory storage for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStorage {
    record: Arc<Mutex<Option<String>>>,
}

impl InMemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates storage that already holds `record`, valid or not.
    pub fn with_record(record: impl Into<String>) -> Self {
        Self {
            record: Arc::new(Mutex::new(Some(record.into()))),
        }
    }

    fn record(&self) -> MutexGuard<'_, Option<String>> {
        self.record.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the stored record.
    pub fn snapshot(&self) -> Option<String> {
        self.record().clone()
    }
}

impl SessionStorage for InMemorySessionStorage {
    fn load(&self) -> Result<Option<String>, SessionStorageError> {
        Ok(self.record().clone())
    }

    fn save(&self, record: &str) -> Result<(), SessionStorageError> {
        *self.record() = Some(record.to_string());
        Ok(())
    }

    fn remove(&self) -> Result<(), SessionStorageError> {
        *self.record() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_storage_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileSessionStorage::in_dir(dir.path().join("state"));

        assert_eq!(storage.load().unwrap(), None);
        storage.save(r#"{"a":1}"#).unwrap();
        assert_eq!(storage.load().unwrap().as_deref(), Some(r#"{"a":1}"#));
        assert!(storage.path().ends_with(SESSION_RECORD_NAME));

        storage.remove().unwrap();
        assert_eq!(storage.load().unwrap(), None);
        storage.remove().unwrap();
    }

    #[test]
    fn test_save_replaces_previous_record() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileSessionStorage::in_dir(dir.path());

        storage.save("first").unwrap();
        storage.save("second").unwrap();
        assert_eq!(storage.load().unwrap().as_deref(), Some("second"));
        assert!(!dir.path().join("storefront.session.json.tmp").exists());
    }

    #[test]
    fn test_in_memory_storage() {
        let storage = InMemorySessionStorage::with_record("garbage");
        assert_eq!(storage.load().unwrap().as_deref(), Some("garbage"));
        storage.remove().unwrap();
        assert_eq!(storage.snapshot(), None);
    }
}
