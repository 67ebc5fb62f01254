//! Redis Model Store - namespaced model hashes and an expiring cache
//!
//! Model records live as fields of one hash per model; cache entries are
//! flat keys with their own TTL. Both share one lazily opened connection.

pub mod backend;
pub mod codec;
pub mod config;
pub mod connection;
pub mod error;
pub mod namespace;
pub mod store;
pub mod tasks;

pub use backend::{KvBackend, MemoryConnector, RedisConnector};
pub use config::Config;
pub use connection::ConnectionState;
pub use error::{Result, StoreError};
pub use store::{CacheStore, DataStore, ModelStore, SetOptions};
pub use tasks::spawn_sweeper;
