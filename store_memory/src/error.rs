use thiserror::Error;

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("lock poisoned: {0}")]
    Poisoned(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<MemoryError> for pesa_store::StoreError {
    fn from(e: MemoryError) -> Self {
        match e {
            MemoryError::Poisoned(msg) => pesa_store::StoreError::ScopeInvalidated(msg),
            MemoryError::Serialization(msg) => pesa_store::StoreError::Serialization(msg),
        }
    }
}

impl From<bincode::Error> for MemoryError {
    fn from(e: bincode::Error) -> Self {
        MemoryError::Serialization(e.to_string())
    }
}
