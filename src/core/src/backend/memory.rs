use std::collections::HashMap;
use std::sync::Mutex;

use super::{quota_check, KeyValueBackend};
use crate::error::StorageError;

/// In-process backend with an optional byte quota.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject writes once stored keys and values would exceed `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Seed a raw value, bypassing the quota (test fixtures, imports).
    pub fn insert_raw(&self, key: impl Into<String>, value: impl Into<String>) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(|e| StorageError::Backend(format!("lock: {e}")))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|e| StorageError::Backend(format!("lock: {e}")))?;
        if let Some(limit) = self.quota_bytes {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            quota_check(key, others + key.len() + value.len(), limit)?;
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|e| StorageError::Backend(format!("lock: {e}")))?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.get("k").unwrap(), None);
        backend.set("k", "v").unwrap();
        assert_eq!(backend.get("k").unwrap().as_deref(), Some("v"));
        backend.remove("k").unwrap();
        assert_eq!(backend.get("k").unwrap(), None);
        assert!(backend.is_empty());
    }

    #[test]
    fn quota_counts_other_keys_but_not_the_replaced_value() {
        let backend = MemoryBackend::with_quota(10);
        backend.set("a", "1234").unwrap(); // 5 bytes
        backend.set("a", "12345678").unwrap(); // replaces, 9 bytes
        let err = backend.set("b", "12").unwrap_err();
        assert_eq!(
            err,
            StorageError::QuotaExceeded {
                key: "b".into(),
                required: 12,
                limit: 10,
            }
        );
        assert_eq!(backend.get("a").unwrap().as_deref(), Some("12345678"));
        assert_eq!(backend.get("b").unwrap(), None);
    }
}
