//! Backend Module
//!
//! The outbound key-value capability: hash and string commands with
//! expiration, plus the connectors that establish a backend handle.

mod memory;
mod redis;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

pub use self::memory::{MemoryBackend, MemoryConnector};
pub use self::redis::{RedisBackend, RedisConnector};

/// Commands the store layer issues against a connected backend.
///
/// Missing keys and fields come back as `None`, never as errors.
#[async_trait]
pub trait KvBackend: Send + Sync {
    /// HGETALL: every field of a hash (empty map if the hash is absent).
    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>>;

    /// HMGET: one slot per requested field, in request order.
    async fn hmget(&self, key: &str, fields: &[String]) -> Result<Vec<Option<String>>>;

    /// HSET: returns the number of newly created fields.
    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<u64>;

    /// HDEL: returns the number of removed fields.
    async fn hdel(&self, key: &str, field: &str) -> Result<u64>;

    /// MGET: one slot per requested key, in request order.
    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<String>>>;

    /// SET: stores a string, clearing any previous expiration.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// EXPIRE: returns false when the key does not exist.
    async fn expire(&self, key: &str, seconds: u64) -> Result<bool>;
}

/// Establishes a backend connection. Called at most once per manager.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn KvBackend>>;
}
