//! Store Module
//!
//! The `DataStore` facade: one lazily connected backend shared by the model
//! store and the expiring cache store.

mod cache;
mod model;


use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::backend::{Connector, KvBackend, RedisConnector};
use crate::config::Config;
use crate::connection::{ConnectionManager, ConnectionState};
use crate::error::Result;
use crate::namespace::Namespacer;

pub use cache::CacheStore;
pub use model::{ModelStore, SetOptions};

// == Data Store ==
/// Entry point for model and cache access.
///
/// Construction never touches the network; the connection is opened by
/// the first operation (or `wait`).
#[derive(Debug, Clone)]
pub struct DataStore {
    connection: Arc<ConnectionManager>,
    models: ModelStore,
    cache: CacheStore,
}

impl DataStore {
    /// Store backed by the Redis server named in `config`.
    pub fn new(config: &Config) -> Self {
        Self::with_connector(config, RedisConnector::new(config.redis_url()))
    }

    pub fn with_connector(config: &Config, connector: impl Connector + 'static) -> Self {
        let connection = Arc::new(ConnectionManager::new(connector));
        let models = ModelStore::new(Arc::clone(&connection), Namespacer::new(config.namespace()));
        let cache = CacheStore::new(models.clone(), config.default_expiry());
        Self {
            connection,
            models,
            cache,
        }
    }

    pub fn models(&self) -> &ModelStore {
        &self.models
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Resolves once the shared connection is ready.
    pub async fn wait(&self) -> Result<Arc<dyn KvBackend>> {
        self.connection.wait().await
    }

    /// Invokes `callback` with the ready connection on a spawned task.
    pub fn wait_then<F>(&self, callback: F) -> JoinHandle<Result<()>>
    where
        F: FnOnce(Arc<dyn KvBackend>) + Send + 'static,
    {
        self.connection.wait_then(callback)
    }

    /// The raw connection, if already established.
    pub fn client(&self) -> Option<Arc<dyn KvBackend>> {
        self.connection.client()
    }

    pub fn state(&self) -> ConnectionState {
        self.connection.state()
    }

    pub fn namespace(&self) -> &str {
        self.models.namespacer().namespace()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryConnector;

    #[tokio::test]
    async fn test_construction_is_lazy() {
        let connector = MemoryConnector::new();
        let store = DataStore::with_connector(&Config::default(), connector.clone());

        assert_eq!(store.state(), ConnectionState::Uninitialized);
        assert_eq!(connector.attempts(), 0);
        assert_eq!(store.namespace(), "biblionarrator^");
    }

    #[tokio::test]
    async fn test_models_and_cache_share_connection() {
        let connector = MemoryConnector::new();
        let store = DataStore::with_connector(&Config::default(), connector.clone());

        store.models().set("m", "k", &1, SetOptions::default()).await.unwrap();
        store.cache().set("k", &2, None).await.unwrap();

        assert_eq!(connector.attempts(), 1);
        assert_eq!(store.state(), ConnectionState::Ready);
        assert!(store.client().is_some());
    }

    #[tokio::test]
    async fn test_wait_then_through_facade() {
        let store = DataStore::with_connector(&Config::default(), MemoryConnector::new());
        let (tx, rx) = tokio::sync::oneshot::channel();

        store
            .wait_then(move |_| {
                let _ = tx.send(());
            })
            .await
            .unwrap()
            .unwrap();

        assert!(rx.await.is_ok());
    }
}
