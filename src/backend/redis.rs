//! Redis backend over a multiplexed async connection

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};
use tracing::{debug, info};

use crate::backend::{Connector, KvBackend};
use crate::error::{Result, StoreError};

/// Connected Redis handle.
///
/// The multiplexed connection is cheap to clone; every command runs on a
/// clone so commands from concurrent callers are pipelined over one socket.
#[derive(Clone)]
pub struct RedisBackend {
    connection: MultiplexedConnection,
}

impl RedisBackend {
    pub fn new(connection: MultiplexedConnection) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl KvBackend for RedisBackend {
    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>> {
        let mut conn = self.connection.clone();
        Ok(conn.hgetall(key).await?)
    }

    async fn hmget(&self, key: &str, fields: &[String]) -> Result<Vec<Option<String>>> {
        let mut conn = self.connection.clone();
        // Explicit HMGET: the typed helper sends HGET for a single field
        let values: Vec<Option<String>> = redis::cmd("HMGET")
            .arg(key)
            .arg(fields)
            .query_async(&mut conn)
            .await?;
        Ok(values)
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<u64> {
        let mut conn = self.connection.clone();
        Ok(conn.hset(key, field, value).await?)
    }

    async fn hdel(&self, key: &str, field: &str) -> Result<u64> {
        let mut conn = self.connection.clone();
        Ok(conn.hdel(key, field).await?)
    }

    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<String>>> {
        let mut conn = self.connection.clone();
        let values: Vec<Option<String>> = redis::cmd("MGET")
            .arg(keys)
            .query_async(&mut conn)
            .await?;
        Ok(values)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut conn = self.connection.clone();
        let _: () = conn.set(key, value).await?;
        Ok(())
    }

    async fn expire(&self, key: &str, seconds: u64) -> Result<bool> {
        let mut conn = self.connection.clone();
        let seconds = i64::try_from(seconds).unwrap_or(i64::MAX);
        Ok(conn.expire(key, seconds).await?)
    }
}

// == Redis Connector ==
/// Opens a Redis connection from a `redis://` URL.
#[derive(Debug, Clone)]
pub struct RedisConnector {
    url: String,
}

impl RedisConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Connector for RedisConnector {
    async fn connect(&self) -> Result<Arc<dyn KvBackend>> {
        debug!(url = %self.url, "opening redis connection");
        let client = Client::open(self.url.as_str())
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        info!(url = %self.url, "redis connection established");

        let backend: Arc<dyn KvBackend> = Arc::new(RedisBackend::new(connection));
        Ok(backend)
    }
}
