//! Storage error types.

use thiserror::Error;

/// Storage operation errors.
///
/// Protocol-level outcomes (collision, conflict, not found) are *not*
/// errors; they are the boolean and `Option` results of the trait methods.
/// An `Err` always means the backend itself failed.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;
