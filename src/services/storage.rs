//! Session-scoped key/value storage
//!
//! Values live for the login session: the default directory sits under the
//! runtime dir, which the OS clears when the session ends.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing::{debug, warn};

use crate::errors::StorageError;

/// Minimal string store the timer persists its snapshot into
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Default directory for session storage
pub fn default_session_dir() -> PathBuf {
    dirs::runtime_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("focus-timer")
}

/// One JSON file per key inside a session directory
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    dir: PathBuf,
}

impl FileSessionStorage {
    /// Open storage in `dir`, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| StorageError::Io {
            key: dir.display().to_string(),
            source: e,
        })?;
        debug!("Session storage at {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", file_name))
    }
}

impl SessionStorage for FileSessionStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io {
                key: key.to_string(),
                source: e,
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let temp = path.with_extension("json.tmp");

        if let Err(e) = fs::write(&temp, value) {
            if let Err(cleanup) = fs::remove_file(&temp) {
                debug!("Temp file cleanup after failed write: {}", cleanup);
            }
            return Err(StorageError::Io {
                key: key.to_string(),
                source: e,
            });
        }

        if let Err(e) = fs::rename(&temp, &path) {
            if let Err(cleanup) = fs::remove_file(&temp) {
                warn!("Failed to clean up {}: {}", temp.display(), cleanup);
            }
            return Err(StorageError::Io {
                key: key.to_string(),
                source: e,
            });
        }

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io {
                key: key.to_string(),
                source: e,
            }),
        }
    }
}

/// In-process storage, for tests and for running without a session dir
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.values.lock().map_err(|e| StorageError::Unavailable {
            message: format!("Failed to lock memory storage: {}", e),
        })
    }
}

impl SessionStorage for MemorySessionStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_storage_set_get_remove() {
        let dir = TempDir::new().unwrap();
        let storage = FileSessionStorage::open(dir.path().join("session")).unwrap();

        assert_eq!(storage.get("pomodoroTimerState").unwrap(), None);

        storage.set("pomodoroTimerState", "{\"a\":1}").unwrap();
        assert_eq!(
            storage.get("pomodoroTimerState").unwrap().as_deref(),
            Some("{\"a\":1}")
        );

        storage.set("pomodoroTimerState", "{\"a\":2}").unwrap();
        assert_eq!(
            storage.get("pomodoroTimerState").unwrap().as_deref(),
            Some("{\"a\":2}")
        );

        storage.remove("pomodoroTimerState").unwrap();
        assert_eq!(storage.get("pomodoroTimerState").unwrap(), None);
    }

    #[test]
    fn removing_missing_key_is_ok() {
        let dir = TempDir::new().unwrap();
        let storage = FileSessionStorage::open(dir.path()).unwrap();
        storage.remove("never-written").unwrap();
    }

    #[test]
    fn keys_cannot_escape_the_directory() {
        let dir = TempDir::new().unwrap();
        let storage = FileSessionStorage::open(dir.path()).unwrap();
        storage.set("../outside", "x").unwrap();
        assert!(dir.path().join("___outside.json").exists());
        assert!(!dir.path().parent().unwrap().join("outside.json").exists());
    }

    #[test]
    fn memory_storage_round_trips() {
        let storage = MemorySessionStorage::new();
        storage.set("k", "v").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("v"));
        storage.remove("k").unwrap();
        assert_eq!(storage.get("k").unwrap(), None);
    }
}
