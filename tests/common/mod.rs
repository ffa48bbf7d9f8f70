//! Shared integration test helpers for linemark.
//!
//! Include this module at the top of each test file that needs it:
//!
//! ```ignore
//! mod common;
//! use common::{memory_session, pos};
//! ```
//!
//! The `#[allow(dead_code)]` attribute suppresses warnings when only a subset
//! of helpers are used per file.

#![allow(dead_code)]

use linemark::storage::{KeyValueStore, MemoryStore};
use linemark::{BookmarksConfig, ColorAssigner, Position, Session, StorageError};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

/// Seed used for every test session so group colors are reproducible.
pub const SEED: u64 = 42;

pub fn pos(file: &str, line: u32) -> Position {
    Position::new(file, line)
}

/// A session over an empty in-memory store with default configuration.
pub fn memory_session() -> Session {
    session_with(Box::new(MemoryStore::new()), BookmarksConfig::default())
}

pub fn session_with(store: Box<dyn KeyValueStore + Send>, config: BookmarksConfig) -> Session {
    Session::init_with_colors(store, config, ColorAssigner::with_seed(SEED))
        .expect("Failed to init session")
}

/// Creates a temporary directory and the path of a state file inside it.
///
/// The `TempDir` must be kept alive for the duration of the test.
pub fn state_file() -> (TempDir, std::path::PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("bookmarks.yaml");
    (temp_dir, path)
}

/// In-memory store whose write count stays observable after the session
/// takes ownership of it.
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryStore,
    writes: Arc<AtomicUsize>,
}

impl CountingStore {
    pub fn new() -> (Self, Arc<AtomicUsize>) {
        let store = Self::default();
        let writes = Arc::clone(&store.writes);
        (store, writes)
    }
}

impl KeyValueStore for CountingStore {
    fn get_raw(&self, key: &str) -> Result<Option<Value>, StorageError> {
        self.inner.get_raw(key)
    }

    fn set_raw(&mut self, key: &str, value: Value) -> Result<(), StorageError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set_raw(key, value)
    }
}

pub fn writes(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}

/// Which writes a [`FailingStore`] rejects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailOn {
    Nothing,
    Everything,
    Key(&'static str),
}

/// In-memory store that rejects writes on demand, like a full disk.
///
/// Clones share values and the failure switch, so a test keeps one handle
/// while the session owns another. Rejected writes leave the values
/// untouched.
#[derive(Clone)]
pub struct FailingStore {
    values: Arc<Mutex<HashMap<String, Value>>>,
    fail_on: Arc<Mutex<FailOn>>,
}

impl FailingStore {
    pub fn new() -> Self {
        Self {
            values: Arc::new(Mutex::new(HashMap::new())),
            fail_on: Arc::new(Mutex::new(FailOn::Nothing)),
        }
    }

    pub fn fail_on(&self, mode: FailOn) {
        *self.fail_on.lock() = mode;
    }

    pub fn heal(&self) {
        self.fail_on(FailOn::Nothing);
    }

    /// Copy of every stored value.
    pub fn contents(&self) -> HashMap<String, Value> {
        self.values.lock().clone()
    }
}

impl KeyValueStore for FailingStore {
    fn get_raw(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set_raw(&mut self, key: &str, value: Value) -> Result<(), StorageError> {
        let rejected = match &*self.fail_on.lock() {
            FailOn::Nothing => false,
            FailOn::Everything => true,
            FailOn::Key(failing) => *failing == key,
        };
        if rejected {
            return Err(StorageError::Io(std::io::Error::other("disk full")));
        }
        self.values.lock().insert(key.to_string(), value);
        Ok(())
    }
}

/// Lines of `file` in `group`, sorted.
pub fn lines_in(session: &Session, file: &str, group: &str) -> Vec<u32> {
    let mut lines: Vec<u32> = session
        .bookmarks()
        .list_by_file(file)
        .into_iter()
        .filter(|b| b.group == group)
        .map(|b| b.line())
        .collect();
    lines.sort_unstable();
    lines
}
