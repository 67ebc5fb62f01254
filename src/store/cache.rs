//! Expiring Cache Store
//!
//! Flat keys under the reserved `cache^` model, each with its own TTL.

use std::collections::HashMap;

use serde::{de::DeserializeOwned, Serialize};

use crate::config::DEFAULT_EXPIRY;
use crate::error::Result;
use crate::namespace::CACHE_MODEL;
use crate::store::model::{ModelStore, SetOptions};

// == Cache Store ==
#[derive(Debug, Clone)]
pub struct CacheStore {
    models: ModelStore,
    default_expiry: u64,
}

impl CacheStore {
    /// A zero `default_expiry` is replaced by `DEFAULT_EXPIRY`.
    pub fn new(models: ModelStore, default_expiry: u64) -> Self {
        let default_expiry = if default_expiry == 0 {
            DEFAULT_EXPIRY
        } else {
            default_expiry
        };
        Self {
            models,
            default_expiry,
        }
    }

    /// Seconds applied when `set` is given no expiration.
    pub fn default_expiry(&self) -> u64 {
        self.default_expiry
    }

    // == Get One ==
    pub async fn get_one<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let mut found = self.models.read_flat(CACHE_MODEL, &[key.to_string()]).await?;
        Ok(found.remove(key).flatten())
    }

    // == Get Many ==
    /// Keyed by the requested cache keys; absent entries map to `None`.
    pub async fn get_many<T: DeserializeOwned>(
        &self,
        keys: &[String],
    ) -> Result<HashMap<String, Option<T>>> {
        self.models.read_flat(CACHE_MODEL, keys).await
    }

    // == Set ==
    /// Stores `value` for `expiration` seconds.
    ///
    /// `None` or zero falls back to the configured default expiry.
    /// If the EXPIRE step fails the value may already be stored without a TTL.
    pub async fn set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        expiration: Option<u64>,
    ) -> Result<()> {
        let ttl = expiration
            .filter(|&secs| secs > 0)
            .unwrap_or(self.default_expiry);
        self.models
            .write(CACHE_MODEL, key, value, SetOptions::expiring(ttl))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::{json, Value};

    use crate::backend::{KvBackend, MemoryConnector};
    use crate::connection::ConnectionManager;
    use crate::error::StoreError;
    use crate::namespace::Namespacer;

    fn cache(default_expiry: u64) -> (CacheStore, MemoryConnector) {
        let connector = MemoryConnector::new();
        let manager = Arc::new(ConnectionManager::new(connector.clone()));
        let models = ModelStore::new(manager, Namespacer::new("test^"));
        (CacheStore::new(models, default_expiry), connector)
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let (cache, connector) = cache(600);
        cache.set("search:dune", &json!([1, 2, 3]), Some(5)).await.unwrap();

        let hit: Option<Value> = cache.get_one("search:dune").await.unwrap();
        assert_eq!(hit, Some(json!([1, 2, 3])));
        assert_eq!(
            connector.backend().keys().await,
            vec!["test^cache^search:dune".to_string()]
        );
    }

    #[tokio::test]
    async fn test_get_missing() {
        let (cache, _) = cache(600);
        let miss: Option<Value> = cache.get_one("nothing").await.unwrap();
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn test_default_expiry_applied() {
        let (cache, connector) = cache(30);
        cache.set("a", &1, None).await.unwrap();
        cache.set("b", &2, Some(0)).await.unwrap();

        let backend = connector.backend();
        for key in ["test^cache^a", "test^cache^b"] {
            let ttl = backend.ttl_ms(key).await.unwrap();
            assert!(ttl <= 30_000 && ttl >= 29_000, "ttl for {key} was {ttl}");
        }
    }

    #[tokio::test]
    async fn test_zero_default_expiry_still_expires() {
        let (cache, connector) = cache(0);
        assert_eq!(cache.default_expiry(), 600);

        cache.set("k", &"v", None).await.unwrap();

        let hit: Option<String> = cache.get_one("k").await.unwrap();
        assert_eq!(hit.as_deref(), Some("v"));
        assert!(connector.backend().ttl_ms("test^cache^k").await.is_some());
    }

    #[tokio::test]
    async fn test_corrupt_entry_names_flat_key() {
        let (cache, connector) = cache(600);
        connector.backend().set("test^cache^bad", "{oops").await.unwrap();

        match cache.get_one::<Value>("bad").await {
            Err(StoreError::Deserialization { key, .. }) => assert_eq!(key, "test^cache^bad"),
            other => panic!("expected deserialization error, got {:?}", other),
        }

        let keys = vec!["bad".to_string(), "missing".to_string()];
        match cache.get_many::<Value>(&keys).await {
            Err(StoreError::Deserialization { key, .. }) => assert_eq!(key, "test^cache^bad"),
            other => panic!("expected deserialization error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_many_uses_requested_keys() {
        let (cache, _) = cache(600);
        cache.set("k1", &"v1", None).await.unwrap();

        let keys = vec!["k1".to_string(), "k2".to_string()];
        let got: HashMap<String, Option<String>> = cache.get_many(&keys).await.unwrap();

        assert_eq!(got.len(), 2);
        assert_eq!(got["k1"], Some("v1".to_string()));
        assert_eq!(got["k2"], None);
    }

    #[tokio::test]
    async fn test_entry_expires() {
        let (cache, _) = cache(600);
        cache.set("short", &"v", Some(1)).await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;

        let gone: Option<String> = cache.get_one("short").await.unwrap();
        assert!(gone.is_none());
    }
}
