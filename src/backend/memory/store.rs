//! Memory Backend Store
//!
//! HashMap keyspace with string and hash entries and per-key expiration.
//! Expired entries read as absent and are dropped on the next write to the
//! same key or by the sweeper.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use super::entry::{MemoryEntry, StoredValue};
use crate::backend::KvBackend;
use crate::error::{Result, StoreError};

const WRONGTYPE: &str = "WRONGTYPE Operation against a key holding the wrong kind of value";

// == Memory Backend ==
/// In-process key-value backend.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, MemoryEntry>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    // == Length ==
    /// Number of live (unexpired) keys.
    pub async fn len(&self) -> usize {
        let now = Utc::now();
        let entries = self.entries.read().await;
        entries.values().filter(|e| !e.is_expired_at(now)).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Live keys, sorted.
    pub async fn keys(&self) -> Vec<String> {
        let now = Utc::now();
        let entries = self.entries.read().await;
        let mut keys: Vec<String> = entries
            .iter()
            .filter(|(_, e)| !e.is_expired_at(now))
            .map(|(k, _)| k.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Remaining TTL of a key in milliseconds; None if absent or persistent.
    pub async fn ttl_ms(&self, key: &str) -> Option<u64> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|e| !e.is_expired())
            .and_then(MemoryEntry::ttl_remaining_ms)
    }

    // == Purge Expired ==
    /// Removes all expired entries, returning how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, e| !e.is_expired_at(now));
        before - entries.len()
    }

    /// Runs `read` against the live entry under `key`, if any.
    async fn with_live<R>(&self, key: &str, read: impl FnOnce(Option<&MemoryEntry>) -> R) -> R {
        let entries = self.entries.read().await;
        read(entries.get(key).filter(|e| !e.is_expired()))
    }
}

/// Drops `key` if it has expired, so writes start from a clean slot.
fn evict_if_expired(entries: &mut HashMap<String, MemoryEntry>, key: &str) {
    if entries.get(key).is_some_and(MemoryEntry::is_expired) {
        entries.remove(key);
    }
}

fn wrong_type() -> StoreError {
    StoreError::Operation(WRONGTYPE.to_string())
}

#[async_trait]
impl KvBackend for MemoryBackend {
    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>> {
        self.with_live(key, |entry| match entry.map(|e| &e.value) {
            None => Ok(HashMap::new()),
            Some(StoredValue::Hash(fields)) => Ok(fields.clone()),
            Some(StoredValue::Text(_)) => Err(wrong_type()),
        })
        .await
    }

    async fn hmget(&self, key: &str, fields: &[String]) -> Result<Vec<Option<String>>> {
        self.with_live(key, |entry| match entry.map(|e| &e.value) {
            None => Ok(vec![None; fields.len()]),
            Some(StoredValue::Hash(stored)) => {
                Ok(fields.iter().map(|f| stored.get(f).cloned()).collect())
            }
            Some(StoredValue::Text(_)) => Err(wrong_type()),
        })
        .await
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<u64> {
        let mut entries = self.entries.write().await;
        evict_if_expired(&mut entries, key);

        let entry = entries
            .entry(key.to_string())
            .or_insert_with(MemoryEntry::empty_hash);
        match &mut entry.value {
            StoredValue::Hash(fields) => {
                let created = fields.insert(field.to_string(), value.to_string()).is_none();
                debug!(key, field, created, "memory hset");
                Ok(u64::from(created))
            }
            StoredValue::Text(_) => Err(wrong_type()),
        }
    }

    async fn hdel(&self, key: &str, field: &str) -> Result<u64> {
        let mut entries = self.entries.write().await;
        evict_if_expired(&mut entries, key);

        let Some(entry) = entries.get_mut(key) else {
            return Ok(0);
        };
        let removed = match &mut entry.value {
            StoredValue::Hash(fields) => u64::from(fields.remove(field).is_some()),
            StoredValue::Text(_) => return Err(wrong_type()),
        };
        // Redis drops a hash once its last field is gone
        if matches!(&entry.value, StoredValue::Hash(fields) if fields.is_empty()) {
            entries.remove(key);
        }
        Ok(removed)
    }

    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<String>>> {
        let now = Utc::now();
        let entries = self.entries.read().await;
        // MGET reports non-string keys as missing rather than failing
        Ok(keys
            .iter()
            .map(|k| match entries.get(k) {
                Some(entry) if !entry.is_expired_at(now) => match &entry.value {
                    StoredValue::Text(text) => Some(text.clone()),
                    StoredValue::Hash(_) => None,
                },
                _ => None,
            })
            .collect())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            MemoryEntry::new(StoredValue::Text(value.to_string())),
        );
        debug!(key, "memory set");
        Ok(())
    }

    async fn expire(&self, key: &str, seconds: u64) -> Result<bool> {
        let mut entries = self.entries.write().await;
        evict_if_expired(&mut entries, key);

        match entries.get_mut(key) {
            Some(entry) => {
                entry.expire_in(seconds);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
