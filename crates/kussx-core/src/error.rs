use thiserror::Error;

/// Errors raised while constructing core values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid short key: {0}")]
    InvalidShortKey(String),
}

/// Failures reported by a [`KvStore`](crate::KvStore) implementation.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
    #[error("storage operation failed: {0}")]
    Operation(String),
}

/// Errors surfaced by the [`Shortener`](crate::Shortener) operations.
#[derive(Debug, Clone, Error)]
pub enum ShortenerError {
    #[error("invalid request: {0}")]
    Validation(String),
    #[error("short key not found: {0}")]
    NotFound(String),
    /// An allocated key already maps to a record. Recovered internally by
    /// retrying the allocation; only visible to callers of the allocation step.
    #[error("allocated key already exists: {0}")]
    KeyCollision(String),
    #[error("could not allocate a unique key after {attempts} attempts")]
    AllocationExhausted { attempts: u32 },
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
