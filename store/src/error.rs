use pesa_records::RecordError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("duplicate {0}")]
    Duplicate(String),

    #[error("write scope invalidated: {0}")]
    ScopeInvalidated(String),

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Record(#[from] RecordError),
}
