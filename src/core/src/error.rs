use thiserror::Error;

/// Failures raised by a key-value backend.
///
/// The adapter contains every one of these; none reaches UI callers as a
/// panic. They surface only inside `ReadStatus` / `WriteOutcome` values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("storage backend unavailable")]
    Unavailable,

    #[error("quota exceeded writing {key}: {required} bytes needed, {limit} allowed")]
    QuotaExceeded {
        key: String,
        required: usize,
        limit: usize,
    },

    #[error("backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialize(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Serialize(e.to_string())
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(e: rusqlite::Error) -> Self {
        StorageError::Backend(e.to_string())
    }
}
