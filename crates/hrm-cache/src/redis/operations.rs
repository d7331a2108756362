//! Redis store implementation.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::debug;

use hrm_core::error::{AppError, ErrorKind};
use hrm_core::result::AppResult;
use hrm_core::traits::KeyValueStore;

use super::client::RedisClient;

/// Lua script for ownership-checked deletion.
///
/// KEYS[1] = key
/// ARGV[1] = expected value
///
/// Returns the number of keys deleted (0 or 1).
const COMPARE_AND_DELETE_SCRIPT: &str = r#"
    if redis.call('GET', KEYS[1]) == ARGV[1] then
        return redis.call('DEL', KEYS[1])
    else
        return 0
    end
"#;

/// Redis-backed key-value store.
#[derive(Debug, Clone)]
pub struct RedisStore {
    /// Redis client.
    client: RedisClient,
}

impl RedisStore {
    /// Create a new Redis store.
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    /// Map a Redis error to an AppError.
    fn map_err(e: redis::RedisError) -> AppError {
        AppError::with_source(ErrorKind::Store, format!("Redis error: {e}"), e)
    }
}

/// Millisecond TTL argument; Redis rejects zero.
fn ttl_millis(ttl: Duration) -> u64 {
    (ttl.as_millis() as u64).max(1)
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let result: Option<String> = conn.get(&full_key).await.map_err(Self::map_err)?;
        Ok(result)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let _: () = conn
            .pset_ex(&full_key, value, ttl_millis(ttl))
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();

        // SET key value PX ttl NX
        let result: Option<String> = redis::cmd("SET")
            .arg(&full_key)
            .arg(value)
            .arg("PX")
            .arg(ttl_millis(ttl))
            .arg("NX")
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;

        Ok(result.is_some())
    }

    async fn delete(&self, keys: &[&str]) -> AppResult<u64> {
        if keys.is_empty() {
            return Ok(0);
        }
        let full_keys: Vec<String> = keys.iter().map(|k| self.client.prefixed_key(k)).collect();
        let mut conn = self.client.conn_mut();
        let removed: u64 = conn.del(&full_keys).await.map_err(Self::map_err)?;
        debug!(count = removed, "Deleted keys");
        Ok(removed)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> AppResult<bool> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let result: bool = conn
            .pexpire(&full_key, ttl_millis(ttl) as i64)
            .await
            .map_err(Self::map_err)?;
        Ok(result)
    }

    async fn compare_and_delete(&self, key: &str, expected: &str) -> AppResult<u64> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();

        let removed: u64 = redis::Script::new(COMPARE_AND_DELETE_SCRIPT)
            .key(&full_key)
            .arg(expected)
            .invoke_async(&mut conn)
            .await
            .map_err(Self::map_err)?;

        Ok(removed)
    }

    async fn incr(&self, key: &str) -> AppResult<i64> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let result: i64 = conn.incr(&full_key, 1i64).await.map_err(Self::map_err)?;
        Ok(result)
    }

    async fn ttl(&self, key: &str) -> AppResult<Option<Duration>> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        // -2: missing, -1: no expiry
        let millis: i64 = conn.pttl(&full_key).await.map_err(Self::map_err)?;
        Ok((millis >= 0).then(|| Duration::from_millis(millis as u64)))
    }

    async fn health_check(&self) -> AppResult<bool> {
        let mut conn = self.client.conn_mut();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(pong == "PONG")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sub_millisecond_ttl_is_clamped() {
        assert_eq!(ttl_millis(Duration::from_micros(10)), 1);
        assert_eq!(ttl_millis(Duration::from_secs(2)), 2000);
    }
}
