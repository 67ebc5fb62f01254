//! Namespacer
//!
//! Derives physical key names so models and tenants never collide in the
//! flat key space of the store.

/// Model token reserved for flat, expiring cache keys.
pub const CACHE_MODEL: &str = "cache^";

/// Prefixes model and record keys with a configured namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespacer {
    namespace: String,
}

impl Namespacer {
    /// `namespace` must already carry its separator (see `Config::namespace`).
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Hash key holding every record of `model`.
    pub fn model_key(&self, model: &str) -> String {
        format!("{}{}", self.namespace, model)
    }

    /// Flat key for one record of `model`.
    pub fn effective_key(&self, model: &str, key: &str) -> String {
        format!("{}{}{}", self.namespace, model, key)
    }

    /// Flat key of a cache entry.
    pub fn cache_key(&self, key: &str) -> String {
        self.effective_key(CACHE_MODEL, key)
    }

    pub fn is_reserved(model: &str) -> bool {
        model == CACHE_MODEL
    }
}
