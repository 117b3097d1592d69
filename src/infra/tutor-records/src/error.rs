use thiserror::Error;

/// Record-level errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("unknown feature: {0}")]
    UnknownFeature(String),
}
