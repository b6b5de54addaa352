//! Redis storage backend
//!
//! This module provides a [`KeyValueStorage`] implementation that keeps the
//! client's durable keys in Redis, so several client processes on one
//! machine can share a session.

use redis::{Client, Commands, Connection};
use tracing::info;

use crate::error::{StorageError, StorageResult};
use crate::storage::KeyValueStorage;

/// Configuration for the Redis storage backend
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis connection URL (e.g., "redis://localhost:6379")
    pub url: String,
    /// Prefix prepended to every storage key
    pub key_prefix: String,
}

impl RedisConfig {
    /// Create a new RedisConfig from environment variables
    ///
    /// # Environment Variables
    /// - `REDIS_URL`: Redis connection URL (default: "redis://localhost:6379")
    /// - `REDIS_KEY_PREFIX`: Key namespace (default: "dashboard:")
    pub fn from_env() -> StorageResult<Self> {
        let url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
        let key_prefix =
            std::env::var("REDIS_KEY_PREFIX").unwrap_or_else(|_| "dashboard:".to_string());

        Ok(RedisConfig { url, key_prefix })
    }

    /// Create a config for `url` with the default key prefix
    pub fn with_url(url: impl Into<String>) -> Self {
        RedisConfig {
            url: url.into(),
            key_prefix: "dashboard:".to_string(),
        }
    }
}

/// Key-value storage kept in Redis
pub struct RedisStorage {
    client: Client,
    key_prefix: String,
}

impl RedisStorage {
    /// Initialize a new Redis storage client
    pub fn new(config: &RedisConfig) -> StorageResult<Self> {
        let client = Client::open(config.url.clone()).map_err(StorageError::Redis)?;
        info!("Redis storage initialized with URL: {}", config.url);
        Ok(RedisStorage {
            client,
            key_prefix: config.key_prefix.clone(),
        })
    }

    /// Get a connection to the server
    fn get_connection(&self) -> StorageResult<Connection> {
        self.client.get_connection().map_err(StorageError::Redis)
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }

    /// Check if Redis is reachable
    pub fn health_check(&self) -> StorageResult<bool> {
        let mut conn = self.get_connection()?;
        let pong: String = redis::cmd("PING")
            .query(&mut conn)
            .map_err(StorageError::Redis)?;
        Ok(pong == "PONG")
    }
}

impl KeyValueStorage for RedisStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        let mut conn = self.get_connection()?;
        let value: Option<String> = conn
            .get(self.namespaced(key))
            .map_err(StorageError::Redis)?;
        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut conn = self.get_connection()?;
        let _: () = conn
            .set(self.namespaced(key), value)
            .map_err(StorageError::Redis)?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        let mut conn = self.get_connection()?;
        let _: u64 = conn
            .del(self.namespaced(key))
            .map_err(StorageError::Redis)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_url_is_rejected() {
        let config = RedisConfig::with_url("not a url");
        assert!(matches!(
            RedisStorage::new(&config),
            Err(StorageError::Redis(_))
        ));
    }

    #[test]
    #[ignore = "requires a running Redis server"]
    fn test_set_get_delete() -> StorageResult<()> {
        let storage = RedisStorage::new(&RedisConfig::with_url("redis://localhost:6379"))?;
        assert!(storage.health_check()?);

        storage.set_item("test_key", "test_value")?;
        assert_eq!(storage.get_item("test_key")?, Some("test_value".to_string()));

        storage.remove_item("test_key")?;
        assert_eq!(storage.get_item("test_key")?, None);

        Ok(())
    }
}
