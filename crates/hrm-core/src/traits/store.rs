//! Key-value store trait backing locks, sessions and OTP challenges.

use std::time::Duration;

use async_trait::async_trait;

use crate::result::AppResult;

/// A Redis-like store exposing the atomic primitives the core relies on.
///
/// The store is the single source of truth shared by every process: no
/// component keeps an authoritative in-memory copy across requests.
/// Implementations are responsible for key prefixing and TTL enforcement.
/// Transport failures surface as [`ErrorKind::Store`](crate::error::ErrorKind::Store)
/// and are never retried here.
#[async_trait]
pub trait KeyValueStore: Send + Sync + std::fmt::Debug + 'static {
    /// Get a value by key. Returns `None` if the key does not exist or has expired.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Set a value with a TTL, replacing any previous value.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()>;

    /// Set a value only if the key does not already exist (`SET NX EX`).
    /// Returns `true` if the value was set.
    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool>;

    /// Delete keys. Returns how many existed.
    async fn delete(&self, keys: &[&str]) -> AppResult<u64>;

    /// Reset the TTL of an existing key. Returns `false` if the key is gone.
    async fn expire(&self, key: &str, ttl: Duration) -> AppResult<bool>;

    /// Atomically delete `key` only if its value equals `expected`.
    /// Returns the number of keys deleted (0 or 1).
    async fn compare_and_delete(&self, key: &str, expected: &str) -> AppResult<u64>;

    /// Increment an integer value by 1. Returns the new value.
    async fn incr(&self, key: &str) -> AppResult<i64>;

    /// Remaining lifetime of a key, `None` if it does not exist or never expires.
    async fn ttl(&self, key: &str) -> AppResult<Option<Duration>>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
