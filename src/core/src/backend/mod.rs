mod memory;
mod sqlite;

pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::StorageError;

/// Synchronous string key-value storage.
///
/// Implementations report failures as `StorageError`; they are never expected
/// to panic. All methods use `&self`, so implementations handle interior
/// mutability themselves (e.g. `Mutex<Connection>` for sqlite).
pub trait KeyValueBackend: Send + Sync + 'static {
    /// Read the raw value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

pub(crate) fn quota_check(key: &str, required: usize, limit: usize) -> Result<(), StorageError> {
    if required > limit {
        return Err(StorageError::QuotaExceeded {
            key: key.to_string(),
            required,
            limit,
        });
    }
    Ok(())
}

/// Presence-aware wrapper every store talks to.
///
/// A missing backend (no storage in this execution context) is a normal
/// state: reads and writes report `StorageError::Unavailable`. Failures are
/// logged here once so callers only branch on the outcome.
#[derive(Clone, Default)]
pub struct StorageAdapter {
    backend: Option<Arc<dyn KeyValueBackend>>,
    locks: Arc<KeyLocks>,
}

impl StorageAdapter {
    pub fn new(backend: Arc<dyn KeyValueBackend>) -> Self {
        Self {
            backend: Some(backend),
            locks: Arc::new(KeyLocks::default()),
        }
    }

    /// Adapter for an execution context without storage.
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let backend = self.backend.as_ref().ok_or(StorageError::Unavailable)?;
        backend.get(key).inspect_err(|error| {
            tracing::warn!(%key, "storage read failed: {error}");
        })
    }

    pub fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let backend = self.backend.as_ref().ok_or(StorageError::Unavailable)?;
        backend.set(key, value).inspect_err(|error| {
            tracing::warn!(%key, bytes = value.len(), "storage write failed: {error}");
        })
    }

    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        let backend = self.backend.as_ref().ok_or(StorageError::Unavailable)?;
        backend.remove(key).inspect_err(|error| {
            tracing::warn!(%key, "storage remove failed: {error}");
        })
    }

    /// Run `f` while holding the mutex for `key`.
    ///
    /// Every clone of this adapter shares the same lock table, so two stores
    /// over the same key cannot interleave their read-merge-write cycles.
    pub fn with_key_lock<R>(&self, key: &str, f: impl FnOnce() -> R) -> R {
        let lock = self.locks.lock_for(key);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());
        f()
    }
}

impl std::fmt::Debug for StorageAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageAdapter")
            .field("available", &self.is_available())
            .finish()
    }
}

#[derive(Default)]
struct KeyLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyLocks {
    fn lock_for(&self, key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
