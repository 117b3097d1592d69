use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};

use super::{quota_check, KeyValueBackend};
use crate::error::StorageError;

/// SQLite-backed key-value table.
///
/// Uses a `Mutex<Connection>` for thread-safe interior mutability.
/// The table is created on `open()`.
pub struct SqliteBackend {
    conn: Mutex<Connection>,
    quota_bytes: Option<usize>,
}

impl SqliteBackend {
    /// Open (or create) a sqlite database at the given path.
    pub fn open(path: &Path, quota_bytes: Option<usize>) -> Result<Self, String> {
        let conn = Connection::open(path).map_err(|e| format!("sqlite open: {e}"))?;
        let backend = Self {
            conn: Mutex::new(conn),
            quota_bytes,
        };
        backend.migrate()?;
        Ok(backend)
    }

    /// Open an in-memory database (useful for tests).
    pub fn open_memory(quota_bytes: Option<usize>) -> Result<Self, String> {
        let conn = Connection::open_in_memory().map_err(|e| format!("sqlite open: {e}"))?;
        let backend = Self {
            conn: Mutex::new(conn),
            quota_bytes,
        };
        backend.migrate()?;
        Ok(backend)
    }

    fn migrate(&self) -> Result<(), String> {
        let conn = self.conn.lock().map_err(|e| format!("lock: {e}"))?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS kv (
                key        TEXT PRIMARY KEY,
                value      TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            ",
        )
        .map_err(|e| format!("migrate: {e}"))?;
        Ok(())
    }
}

impl KeyValueBackend for SqliteBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| StorageError::Backend(format!("lock: {e}")))?;
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| StorageError::Backend(format!("lock: {e}")))?;
        if let Some(limit) = self.quota_bytes {
            let others: i64 = conn.query_row(
                "SELECT COALESCE(SUM(LENGTH(CAST(key AS BLOB)) + LENGTH(CAST(value AS BLOB))), 0)
                 FROM kv WHERE key != ?1",
                params![key],
                |row| row.get(0),
            )?;
            quota_check(key, others.max(0) as usize + key.len() + value.len(), limit)?;
        }
        conn.execute(
            "INSERT INTO kv (key, value, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at",
            params![key, value, chrono::Utc::now().timestamp_millis()],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| StorageError::Backend(format!("lock: {e}")))?;
        conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}
