//! Error types for the model store
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Store Error Enum ==
/// Unified error type for model and cache operations.
///
/// Cloneable so a failed connection attempt can be handed to every waiter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The initial handshake with the backing store failed
    #[error("Connection failed: {0}")]
    Connection(String),

    /// A single store command failed
    #[error("Store operation failed: {0}")]
    Operation(String),

    /// A stored payload is not valid JSON for the requested type
    #[error("Invalid payload under {key}: {message}")]
    Deserialization { key: String, message: String },

    /// A value could not be encoded to JSON
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// The model name is reserved for the cache store
    #[error("Model name is reserved: {0}")]
    ReservedModel(String),

    /// Configuration could not be parsed
    #[error("Invalid configuration: {0}")]
    Config(String),
}

// == Conversions ==
impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        StoreError::Operation(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

// == Result Type Alias ==
/// Convenience Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
