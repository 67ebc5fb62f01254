//! Memory Backend Module
//!
//! In-process backend with Redis-like hash and string semantics.

mod entry;
mod store;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::backend::{Connector, KvBackend};
use crate::error::Result;

pub use store::MemoryBackend;

// == Memory Connector ==
/// Hands out one shared `MemoryBackend`.
///
/// Several stores built from clones of the same connector see the same
/// keyspace, like several clients of one Redis server.
#[derive(Debug, Clone, Default)]
pub struct MemoryConnector {
    backend: Arc<MemoryBackend>,
    attempts: Arc<AtomicUsize>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn backend(&self) -> Arc<MemoryBackend> {
        Arc::clone(&self.backend)
    }

    /// Number of `connect` calls made so far.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self) -> Result<Arc<dyn KvBackend>> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(attempt, "memory backend connected");
        let backend: Arc<dyn KvBackend> = self.backend.clone();
        Ok(backend)
    }
}
