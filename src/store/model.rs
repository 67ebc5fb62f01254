//! Model Store
//!
//! Per-model hash operations. Each model is one hash at
//! `namespace + model`; record keys are its fields.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::codec;
use crate::connection::ConnectionManager;
use crate::error::{Result, StoreError};
use crate::namespace::Namespacer;

/// Options for `ModelStore::set`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetOptions {
    /// Positive seconds switch the write to an expiring flat key
    pub expiration: Option<u64>,
}

impl SetOptions {
    pub fn expiring(seconds: u64) -> Self {
        Self {
            expiration: Some(seconds),
        }
    }

    fn ttl(&self) -> Option<u64> {
        self.expiration.filter(|&secs| secs > 0)
    }
}

// == Model Store ==
#[derive(Debug, Clone)]
pub struct ModelStore {
    connection: Arc<ConnectionManager>,
    namespacer: Namespacer,
}

impl ModelStore {
    pub fn new(connection: Arc<ConnectionManager>, namespacer: Namespacer) -> Self {
        Self {
            connection,
            namespacer,
        }
    }

    pub fn namespacer(&self) -> &Namespacer {
        &self.namespacer
    }

    // == Get All ==
    /// Every record of `model`, decoded.
    pub async fn get_all<T: DeserializeOwned>(&self, model: &str) -> Result<HashMap<String, T>> {
        check_model(model)?;
        let client = self.connection.connect().await?;
        let hash_key = self.namespacer.model_key(model);

        let raw = client.hgetall(&hash_key).await?;
        debug!(model, fields = raw.len(), "get_all");

        raw.into_iter()
            .map(|(field, payload)| codec::decode_present(&hash_key, &payload).map(|v| (field, v)))
            .collect()
    }

    // == Get Many ==
    /// The requested records; absent ones map to `None`.
    ///
    /// The result always holds exactly the requested keys.
    pub async fn get_many<T: DeserializeOwned>(
        &self,
        model: &str,
        keys: &[String],
    ) -> Result<HashMap<String, Option<T>>> {
        check_model(model)?;
        let client = self.connection.connect().await?;
        if keys.is_empty() {
            return Ok(HashMap::new());
        }
        let hash_key = self.namespacer.model_key(model);

        let raw = client.hmget(&hash_key, keys).await?;
        zip_decoded(std::iter::repeat(hash_key.as_str()), keys, raw)
    }

    // == Get One ==
    pub async fn get_one<T: DeserializeOwned>(&self, model: &str, key: &str) -> Result<Option<T>> {
        check_model(model)?;
        let client = self.connection.connect().await?;
        let hash_key = self.namespacer.model_key(model);

        let raw = client.hmget(&hash_key, &[key.to_string()]).await?;
        let payload = raw.into_iter().next().flatten();
        codec::decode(&hash_key, payload.as_deref())
    }

    // == Set ==
    /// Stores `value` under `key`.
    ///
    /// With a positive `options.expiration` the value goes to the flat key
    /// `namespace + model + key` with that TTL instead of the model hash.
    /// Hash reads never see flat writes and vice versa.
    ///
    /// The flat write is a SET followed by an EXPIRE. If the EXPIRE fails the
    /// error is returned, but the value may already be stored without a TTL.
    pub async fn set<T: Serialize + ?Sized>(
        &self,
        model: &str,
        key: &str,
        value: &T,
        options: SetOptions,
    ) -> Result<()> {
        check_model(model)?;
        self.write(model, key, value, options).await
    }

    // == Delete ==
    /// Removes one record, returning how many fields were removed (0 or 1).
    pub async fn del(&self, model: &str, key: &str) -> Result<u64> {
        check_model(model)?;
        let client = self.connection.connect().await?;
        let removed = client.hdel(&self.namespacer.model_key(model), key).await?;
        debug!(model, key, removed, "del");
        Ok(removed)
    }

    /// `set` without the reserved-model check.
    pub(crate) async fn write<T: Serialize + ?Sized>(
        &self,
        model: &str,
        key: &str,
        value: &T,
        options: SetOptions,
    ) -> Result<()> {
        let payload = codec::encode(value)?;
        let client = self.connection.connect().await?;

        match options.ttl() {
            Some(ttl) => {
                let flat_key = self.namespacer.effective_key(model, key);
                client.set(&flat_key, &payload).await?;
                client.expire(&flat_key, ttl).await?;
                debug!(key = %flat_key, ttl, "set flat");
            }
            None => {
                client
                    .hset(&self.namespacer.model_key(model), key, &payload)
                    .await?;
                debug!(model, key, "set field");
            }
        }
        Ok(())
    }

    /// Reads flat keys `namespace + model + key`.
    pub(crate) async fn read_flat<T: DeserializeOwned>(
        &self,
        model: &str,
        keys: &[String],
    ) -> Result<HashMap<String, Option<T>>> {
        let client = self.connection.connect().await?;
        if keys.is_empty() {
            return Ok(HashMap::new());
        }
        let flat_keys: Vec<String> = keys
            .iter()
            .map(|k| self.namespacer.effective_key(model, k))
            .collect();

        let raw = client.mget(&flat_keys).await?;
        zip_decoded(flat_keys.iter().map(String::as_str), keys, raw)
    }
}

fn check_model(model: &str) -> Result<()> {
    if Namespacer::is_reserved(model) {
        return Err(StoreError::ReservedModel(model.to_string()));
    }
    Ok(())
}

/// Pairs requested keys with their decoded payloads.
///
/// `labels` yields the storage key each slot was read from; decode errors
/// name it.
fn zip_decoded<'a, T: DeserializeOwned>(
    labels: impl Iterator<Item = &'a str>,
    keys: &[String],
    raw: Vec<Option<String>>,
) -> Result<HashMap<String, Option<T>>> {
    if raw.len() != keys.len() {
        return Err(StoreError::Operation(format!(
            "expected {} values, got {}",
            keys.len(),
            raw.len()
        )));
    }
    keys.iter()
        .zip(labels)
        .zip(raw)
        .map(|((key, label), payload)| {
            codec::decode(label, payload.as_deref()).map(|v| (key.clone(), v))
        })
        .collect()
}
