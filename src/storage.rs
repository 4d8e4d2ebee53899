//! Key-value persistence backends and the on-disk envelope format.
//!
//! Each store persists one JSON document under a fixed key, wrapped as
//! `{"state": ..., "version": 0}`. There is no migration logic; `version`
//! is written for compatibility and ignored on read.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const SNAPSHOT_VERSION: u32 = 0;

#[derive(Debug)]
pub enum StorageError {
    Io { key: String, source: std::io::Error },
    Serialize(serde_json::Error),
    Deserialize { key: String, source: serde_json::Error },
    Unavailable(String),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { key, source } => write!(f, "storage io error for '{key}': {source}"),
            Self::Serialize(err) => write!(f, "failed to serialize snapshot: {err}"),
            Self::Deserialize { key, source } => {
                write!(f, "invalid snapshot JSON under '{key}': {source}")
            }
            Self::Unavailable(message) => write!(f, "storage unavailable: {message}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Serialize(err) => Some(err),
            Self::Deserialize { source, .. } => Some(source),
            Self::Unavailable(_) => None,
        }
    }
}

/// Platform key-value store. Values are opaque strings.
pub trait KeyValueStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    state: T,
    #[serde(default)]
    version: u32,
}

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    state: &'a T,
    version: u32,
}

pub fn to_json<T: Serialize>(state: &T) -> Result<String, StorageError> {
    serde_json::to_string(&EnvelopeRef {
        state,
        version: SNAPSHOT_VERSION,
    })
    .map_err(StorageError::Serialize)
}

pub fn from_json<T: DeserializeOwned>(key: &str, json: &str) -> Result<T, StorageError> {
    serde_json::from_str::<Envelope<T>>(json)
        .map(|envelope| envelope.state)
        .map_err(|source| StorageError::Deserialize {
            key: key.to_string(),
            source,
        })
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStorage { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn io_err(key: &str, source: std::io::Error) -> StorageError {
        StorageError::Io {
            key: key.to_string(),
            source,
        }
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_err(key, e)),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| Self::io_err(key, e))?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value).map_err(|e| Self::io_err(key, e))?;
        std::fs::rename(&tmp, &path).map_err(|e| Self::io_err(key, e))
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_err(key, e)),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.values
            .lock()
            .map_err(|_| StorageError::Unavailable("memory storage lock poisoned".to_string()))
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OnboardingState;

    #[test]
    fn envelope_wraps_state_with_version() {
        let json = to_json(&OnboardingState {
            has_completed_onboarding: true,
        })
        .unwrap();
        assert_eq!(json, r#"{"state":{"hasCompletedOnboarding":true},"version":0}"#);
    }

    #[test]
    fn envelope_without_version_still_reads() {
        let state: OnboardingState =
            from_json("k", r#"{"state":{"hasCompletedOnboarding":true}}"#).unwrap();
        assert!(state.has_completed_onboarding);
    }

    #[test]
    fn from_json_invalid() {
        let err = from_json::<OnboardingState>("k", "not json").unwrap_err();
        assert!(err.to_string().contains("'k'"), "{err}");
    }

    #[test]
    fn memory_storage_round_trip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get_item("a").unwrap(), None);
        storage.set_item("a", "1").unwrap();
        assert_eq!(storage.get_item("a").unwrap().as_deref(), Some("1"));
        storage.remove_item("a").unwrap();
        assert_eq!(storage.get_item("a").unwrap(), None);
    }

    #[test]
    fn file_storage_round_trip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let storage = FileStorage::new(tmp.path().join("data"));
        assert_eq!(storage.get_item("shopping-store").unwrap(), None);
        storage.set_item("shopping-store", "{}").unwrap();
        assert!(storage.path_for("shopping-store").exists());
        assert_eq!(
            storage.get_item("shopping-store").unwrap().as_deref(),
            Some("{}")
        );
        storage.remove_item("shopping-store").unwrap();
        storage.remove_item("shopping-store").unwrap();
        assert_eq!(storage.get_item("shopping-store").unwrap(), None);
    }
}
