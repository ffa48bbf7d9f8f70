//! Flat key-value persistence.
//!
//! The core persists three slots (bookmark list, group list, active group)
//! through [`KeyValueStore`]. Each `set_raw` is atomic and last-write-wins
//! from the core's point of view. Two implementations ship with the crate:
//! [`MemoryStore`] for hosts that own persistence themselves (and for tests)
//! and [`FileStore`], a YAML file written with temp-file + rename.

use crate::error::StorageError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

/// Keys of the persisted slots.
pub mod keys {
    pub const BOOKMARKS: &str = "bookmarks";
    pub const GROUPS: &str = "groups";
    pub const ACTIVE_GROUP: &str = "activeGroup";
}

/// A flat, string-keyed store of JSON values.
pub trait KeyValueStore {
    /// Value stored under `key`, or `None` if the key was never written.
    fn get_raw(&self, key: &str) -> Result<Option<Value>, StorageError>;

    /// Replace the value under `key`.
    fn set_raw(&mut self, key: &str, value: Value) -> Result<(), StorageError>;
}

/// Typed helpers over any [`KeyValueStore`].
pub trait KeyValueStoreExt: KeyValueStore {
    /// Typed read with a fallback for keys that were never written.
    fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> Result<T, StorageError> {
        match self.get_raw(key)? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(default),
        }
    }

    fn set<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), StorageError> {
        let value = serde_json::to_value(value)?;
        self.set_raw(key, value)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStoreExt for S {}

/// In-memory store.
///
/// Counts writes so callers can verify that no-op operations do not touch
/// persistence.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, Value>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set_raw` calls so far.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl KeyValueStore for MemoryStore {
    fn get_raw(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn set_raw(&mut self, key: &str, value: Value) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value);
        self.writes += 1;
        Ok(())
    }
}

/// Store backed by a single YAML document mapping keys to values.
///
/// The whole document is rewritten on every `set_raw`; the slot count is
/// tiny, so this keeps every write atomic without a journal.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, Value>,
}

impl FileStore {
    /// Open (or lazily create) the store at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let values = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            if contents.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_yaml_ng::from_str(&contents)?
            }
        } else {
            BTreeMap::new()
        };
        log::debug!("Opened bookmark store {:?} ({} keys)", path, values.len());
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml_ng::to_string(&self.values)?;

        // Atomic save: write to temp file then rename to prevent corruption on crash
        let temp_path = self.path.with_extension("yaml.tmp");
        fs::write(&temp_path, yaml)?;
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get_raw(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn set_raw(&mut self, key: &str, value: Value) -> Result<(), StorageError> {
        let previous = self.values.insert(key.to_string(), value);
        if let Err(e) = self.flush() {
            // Keep memory and disk in agreement when the write fails
            match previous {
                Some(old) => {
                    self.values.insert(key.to_string(), old);
                }
                None => {
                    self.values.remove(key);
                }
            }
            log::error!("Failed to write bookmark store {:?}: {}", self.path, e);
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store_get_default() {
        let store = MemoryStore::new();
        let groups: Vec<String> = store.get(keys::GROUPS, Vec::new()).expect("get");
        assert!(groups.is_empty());
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn test_memory_store_last_write_wins() {
        let mut store = MemoryStore::new();
        store.set(keys::ACTIVE_GROUP, "A").expect("set");
        store.set(keys::ACTIVE_GROUP, "B").expect("set");
        let active: String = store.get(keys::ACTIVE_GROUP, String::new()).expect("get");
        assert_eq!(active, "B");
        assert_eq!(store.writes(), 2);
    }

    #[test]
    fn test_wrong_shape_is_error() {
        let mut store = MemoryStore::new();
        store.set(keys::BOOKMARKS, "not a list").expect("set");
        let result: Result<Vec<u32>, _> = store.get(keys::BOOKMARKS, Vec::new());
        assert!(matches!(result, Err(StorageError::Value(_))));
    }

    #[test]
    fn test_file_store_persists_across_open() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("state").join("bookmarks.yaml");

        let mut store = FileStore::open(&path).expect("open");
        store.set(keys::ACTIVE_GROUP, "Review").expect("set");
        store.set(keys::BOOKMARKS, &vec![1, 2, 3]).expect("set");
        assert!(path.exists());
        assert!(!path.with_extension("yaml.tmp").exists());

        let reopened = FileStore::open(&path).expect("reopen");
        let active: String = reopened.get(keys::ACTIVE_GROUP, String::new()).expect("get");
        let lines: Vec<u32> = reopened.get(keys::BOOKMARKS, Vec::new()).expect("get");
        assert_eq!(active, "Review");
        assert_eq!(lines, vec![1, 2, 3]);
    }

    #[test]
    fn test_file_store_write_failure_keeps_old_value() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("bookmarks.yaml");
        let mut store = FileStore::open(&path).expect("open");
        store.set(keys::ACTIVE_GROUP, "Review").expect("set");

        // A directory in the temp file's place fails the write even for root
        fs::create_dir(path.with_extension("yaml.tmp")).expect("block temp path");

        let result = store.set(keys::ACTIVE_GROUP, "Docs");
        assert!(matches!(result, Err(StorageError::Io(_))));
        let result = store.set(keys::GROUPS, &vec!["Docs"]);
        assert!(matches!(result, Err(StorageError::Io(_))));

        let active: String = store.get(keys::ACTIVE_GROUP, String::new()).expect("get");
        assert_eq!(active, "Review");
        assert!(store.get_raw(keys::GROUPS).expect("get").is_none());

        let reopened = FileStore::open(&path).expect("reopen");
        let active: String = reopened.get(keys::ACTIVE_GROUP, String::new()).expect("get");
        assert_eq!(active, "Review");
        assert!(reopened.get_raw(keys::GROUPS).expect("get").is_none());
    }

    #[test]
    fn test_file_store_empty_file() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("bookmarks.yaml");
        fs::write(&path, "").expect("write");
        let store = FileStore::open(&path).expect("open");
        assert!(store.get_raw(keys::GROUPS).expect("get").is_none());
    }

    #[test]
    fn test_file_store_rejects_garbage() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("bookmarks.yaml");
        fs::write(&path, "- [unterminated").expect("write");
        assert!(matches!(
            FileStore::open(&path),
            Err(StorageError::Yaml(_))
        ));
    }
}
