//! Store manager that dispatches to the configured provider.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use hrm_core::config::StoreConfig;
use hrm_core::error::AppError;
use hrm_core::result::AppResult;
use hrm_core::traits::KeyValueStore;

/// Store manager that wraps the configured key-value store.
///
/// Constructed once at process startup and handed to every component
/// that needs the store; the connection lives as long as the manager.
#[derive(Debug, Clone)]
pub struct StoreManager {
    /// The inner store provider.
    inner: Arc<dyn KeyValueStore>,
}

impl StoreManager {
    /// Create a new store manager from configuration.
    pub async fn new(config: &StoreConfig) -> AppResult<Self> {
        let inner: Arc<dyn KeyValueStore> = match config.provider.as_str() {
            #[cfg(feature = "redis-backend")]
            "redis" => {
                info!("Initializing Redis store provider");
                let client = crate::redis::RedisClient::connect(&config.redis).await?;
                Arc::new(crate::redis::RedisStore::new(client))
            }
            #[cfg(feature = "memory")]
            "memory" => {
                info!("Initializing in-memory store provider");
                Arc::new(crate::memory::MemoryStore::from_config(&config.memory))
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown store provider: '{other}'. Supported: memory, redis"
                )));
            }
        };

        Ok(Self { inner })
    }

    /// Shared handle to the inner provider.
    pub fn shared(&self) -> Arc<dyn KeyValueStore> {
        Arc::clone(&self.inner)
    }
}

#[async_trait]
impl KeyValueStore for StoreManager {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.inner.set(key, value, ttl).await
    }

    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool> {
        self.inner.set_nx(key, value, ttl).await
    }

    async fn delete(&self, keys: &[&str]) -> AppResult<u64> {
        self.inner.delete(keys).await
    }

    async fn expire(&self, key: &str, ttl: Duration) -> AppResult<bool> {
        self.inner.expire(key, ttl).await
    }

    async fn compare_and_delete(&self, key: &str, expected: &str) -> AppResult<u64> {
        self.inner.compare_and_delete(key, expected).await
    }

    async fn incr(&self, key: &str) -> AppResult<i64> {
        self.inner.incr(key).await
    }

    async fn ttl(&self, key: &str) -> AppResult<Option<Duration>> {
        self.inner.ttl(key).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }
}
