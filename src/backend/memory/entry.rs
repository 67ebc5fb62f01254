//! Memory Entry Module
//!
//! A single keyspace slot of the memory backend: a string or a hash, with an
//! optional expiration.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

// == Stored Value ==
/// The two value shapes the store layer uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredValue {
    Text(String),
    Hash(HashMap<String, String>),
}

// == Memory Entry ==
#[derive(Debug, Clone)]
pub struct MemoryEntry {
    pub value: StoredValue,
    pub created_at: DateTime<Utc>,
    /// None = no expiration
    pub expires_at: Option<DateTime<Utc>>,
}

impl MemoryEntry {
    /// Creates an entry without expiration.
    pub fn new(value: StoredValue) -> Self {
        Self {
            value,
            created_at: Utc::now(),
            expires_at: None,
        }
    }

    /// Creates an empty hash entry.
    pub fn empty_hash() -> Self {
        Self::new(StoredValue::Hash(HashMap::new()))
    }

    // == Expire ==
    /// Sets the expiration `seconds` from now.
    ///
    /// Durations past chrono's range leave the entry without expiration.
    pub fn expire_in(&mut self, seconds: u64) {
        self.expires_at = i64::try_from(seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|ttl| Utc::now().checked_add_signed(ttl));
    }

    // == Is Expired ==
    /// An entry is expired once the current time reaches its expiration.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Remaining TTL in milliseconds, or None if no expiration is set.
    pub fn ttl_remaining_ms(&self) -> Option<u64> {
        self.expires_at.map(|expires| {
            let remaining = expires - Utc::now();
            u64::try_from(remaining.num_milliseconds()).unwrap_or(0)
        })
    }
}
