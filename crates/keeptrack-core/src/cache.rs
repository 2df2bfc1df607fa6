//! Local project cache
//!
//! Best-effort persistent shadow copy of the project list, read ahead of the
//! remote API on initial load. Storage failures are absorbed: a failed write
//! is logged and the entry behaves like a cache miss from then on, and corrupt
//! stored data is treated as absent. The cache is a performance aid, never a
//! consistency source.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::error::Error;
use crate::project::Project;

/// Key under which the serialized project list is stored.
pub const PROJECTS_KEY: &str = "keeptrack_projects";

/// Key under which the "already seeded" flag is stored.
pub const SEEDED_KEY: &str = "keeptrack_seeded";

/// Synchronous key -> string storage backing the cache.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// Store a value. Returns false on failure (e.g. quota or I/O error);
    /// implementations must not panic.
    fn set(&self, key: &str, value: &str) -> bool;

    fn remove(&self, key: &str);
}

/// File-backed store: one file per key under a directory.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path_for(key)).ok()
    }

    fn set(&self, key: &str, value: &str) -> bool {
        if let Err(e) = fs::create_dir_all(&self.dir) {
            warn!(key, error = %e, "failed to create cache directory");
            return false;
        }
        match fs::write(self.path_for(key), value) {
            Ok(()) => true,
            Err(e) => {
                warn!(key, error = %e, "failed to write cache entry");
                false
            }
        }
    }

    fn remove(&self, key: &str) {
        let _ = fs::remove_file(self.path_for(key));
    }
}

/// In-memory store, used by tests as a stand-in for the browser's
/// localStorage-style persistence.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned lock only means a panic mid-write; the map itself is fine.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> bool {
        self.entries().insert(key.to_string(), value.to_string());
        true
    }

    fn remove(&self, key: &str) {
        self.entries().remove(key);
    }
}

/// Project list cache over a [`KeyValueStore`], using the two fixed keys.
pub struct ProjectCache<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> ProjectCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Serialize and store the project list. Failure is logged and reported
    /// as `false`, never as an error.
    pub fn save(&self, projects: &[Project]) -> bool {
        let serialized = match serde_json::to_string(projects) {
            Ok(s) => s,
            Err(e) => {
                let err = Error::Cache(format!("failed to serialize projects: {}", e));
                warn!(code = err.code(), "{}", err);
                return false;
            }
        };
        self.store.set(PROJECTS_KEY, &serialized)
    }

    /// Load the cached project list. Missing, corrupt, or non-array data
    /// reads as absent.
    pub fn load(&self) -> Option<Vec<Project>> {
        let data = self.store.get(PROJECTS_KEY)?;
        match serde_json::from_str::<Vec<Project>>(&data) {
            Ok(projects) => Some(projects),
            Err(e) => {
                let err = Error::Cache(format!("corrupt project cache: {}", e));
                warn!(code = err.code(), "{}, treating as absent", err);
                None
            }
        }
    }

    /// Whether the cache has already been seeded from the server.
    pub fn is_seeded(&self) -> bool {
        self.store.get(SEEDED_KEY).as_deref() == Some("true")
    }

    pub fn mark_seeded(&self) {
        if !self.store.set(SEEDED_KEY, "true") {
            warn!("failed to persist seeded flag");
        }
    }

    /// Remove both keys. Used by test and reset paths.
    pub fn clear(&self) {
        debug!("clearing project cache");
        self.store.remove(PROJECTS_KEY);
        self.store.remove(SEEDED_KEY);
    }
}
