//! Custom error types for the common library
//!
//! This module defines the error types raised by the durable key-value
//! storage backends.

use redis::RedisError;
use thiserror::Error;

/// Custom error type for storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// Error occurred while reading or writing the backing file
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored value could not be encoded or decoded
    #[error("Storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Error returned by the Redis backend
    #[error("Redis storage error: {0}")]
    Redis(#[source] RedisError),
}

/// Type alias for Result with StorageError
pub type StorageResult<T> = Result<T, StorageError>;
