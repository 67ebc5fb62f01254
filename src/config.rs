//! Configuration Module
//!
//! Loads store location, namespace and cache expiry from a JSON document or
//! from environment variables.

use std::env;

use serde::Deserialize;

use crate::error::{Result, StoreError};

// == Defaults ==
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 6379;
pub const DEFAULT_NAMESPACE: &str = "biblionarrator";
pub const DEFAULT_EXPIRY: u64 = 600;

/// Appended to every namespace so one namespace is never a prefix of another.
pub const NAMESPACE_SEPARATOR: char = '^';

/// Store configuration.
///
/// Mirrors the `{ backendconf: { redis: {..} }, cacheconf: {..} }` document;
/// every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backendconf: BackendConfig,
    #[serde(default)]
    pub cacheconf: CacheConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub redis: RedisConfig,
}

/// Redis location and key namespace.
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Raw namespace, without the separator
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

/// Expiring cache settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Expiration in seconds applied when a cache write gives none
    #[serde(default = "default_expiry")]
    pub defaultexpiry: u64,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_expiry() -> u64 {
    DEFAULT_EXPIRY
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            namespace: default_namespace(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            defaultexpiry: default_expiry(),
        }
    }
}

impl Config {
    /// Creates a Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `REDIS_HOST` - Redis host (default: 127.0.0.1)
    /// - `REDIS_PORT` - Redis port (default: 6379)
    /// - `REDIS_NAMESPACE` - Key namespace (default: biblionarrator)
    /// - `CACHE_DEFAULT_EXPIRY` - Cache expiry in seconds (default: 600)
    pub fn from_env() -> Self {
        Self {
            backendconf: BackendConfig {
                redis: RedisConfig {
                    host: env::var("REDIS_HOST").unwrap_or_else(|_| default_host()),
                    port: env::var("REDIS_PORT")
                        .ok()
                        .and_then(|v| v.parse().ok())
                        .unwrap_or(DEFAULT_PORT),
                    namespace: env::var("REDIS_NAMESPACE")
                        .ok()
                        .filter(|v| !v.is_empty())
                        .unwrap_or_else(default_namespace),
                },
            },
            cacheconf: CacheConfig {
                defaultexpiry: env::var("CACHE_DEFAULT_EXPIRY")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_EXPIRY),
            },
        }
    }

    /// Parses a JSON configuration document.
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| StoreError::Config(e.to_string()))
    }

    /// Builder used by tests and embedders to pick a namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.backendconf.redis.namespace = namespace.into();
        self
    }

    /// Effective namespace, always ending in the separator.
    ///
    /// An empty namespace falls back to the default.
    pub fn namespace(&self) -> String {
        let raw = &self.backendconf.redis.namespace;
        let base = if raw.is_empty() {
            DEFAULT_NAMESPACE
        } else {
            raw.as_str()
        };
        format!("{base}{NAMESPACE_SEPARATOR}")
    }

    /// Default cache expiration in seconds. Zero falls back to the default,
    /// so cache entries always carry a TTL.
    pub fn default_expiry(&self) -> u64 {
        match self.cacheconf.defaultexpiry {
            0 => DEFAULT_EXPIRY,
            secs => secs,
        }
    }

    /// Connection URL for the configured host and port.
    pub fn redis_url(&self) -> String {
        let redis = &self.backendconf.redis;
        format!("redis://{}:{}/", redis.host, redis.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.backendconf.redis.host, "127.0.0.1");
        assert_eq!(config.backendconf.redis.port, 6379);
        assert_eq!(config.namespace(), "biblionarrator^");
        assert_eq!(config.default_expiry(), 600);
        assert_eq!(config.redis_url(), "redis://127.0.0.1:6379/");
    }

    #[test]
    fn test_config_from_json_partial() {
        let config = Config::from_json(
            r#"{"backendconf": {"redis": {"port": 6380, "namespace": "tenant"}}}"#,
        )
        .unwrap();
        assert_eq!(config.backendconf.redis.host, "127.0.0.1");
        assert_eq!(config.backendconf.redis.port, 6380);
        assert_eq!(config.namespace(), "tenant^");
        assert_eq!(config.default_expiry(), 600);
    }

    #[test]
    fn test_config_from_json_empty_document() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config.namespace(), "biblionarrator^");
        assert_eq!(config.cacheconf.defaultexpiry, 600);
    }

    #[test]
    fn test_config_from_json_cacheconf() {
        let config = Config::from_json(r#"{"cacheconf": {"defaultexpiry": 30}}"#).unwrap();
        assert_eq!(config.default_expiry(), 30);
    }

    #[test]
    fn test_zero_default_expiry_falls_back() {
        let config = Config::from_json(r#"{"cacheconf": {"defaultexpiry": 0}}"#).unwrap();
        assert_eq!(config.default_expiry(), 600);
    }

    #[test]
    fn test_config_from_json_invalid() {
        let result = Config::from_json(r#"{"backendconf": {"redis": {"port": "x"}}}"#);
        assert!(matches!(result, Err(StoreError::Config(_))));
    }

    #[test]
    fn test_namespace_always_suffixed() {
        let config = Config::default().with_namespace("a^");
        assert_eq!(config.namespace(), "a^^");

        let config = Config::default().with_namespace("");
        assert_eq!(config.namespace(), "biblionarrator^");
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("REDIS_HOST");
        env::remove_var("REDIS_PORT");
        env::remove_var("REDIS_NAMESPACE");
        env::remove_var("CACHE_DEFAULT_EXPIRY");

        let config = Config::from_env();
        assert_eq!(config.backendconf.redis.host, "127.0.0.1");
        assert_eq!(config.backendconf.redis.port, 6379);
        assert_eq!(config.namespace(), "biblionarrator^");
        assert_eq!(config.default_expiry(), 600);
    }
}
