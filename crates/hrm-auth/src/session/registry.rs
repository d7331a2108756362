//! Registry of the currently valid tokens per principal.
//!
//! A signed token is only honoured while it string-equals the token
//! registered for its subject. Revoking deletes the registration, which
//! invalidates tokens that are still cryptographically valid. Entries
//! carry the token's own TTL, so abandoned sessions need no sweep.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use hrm_cache::keys;
use hrm_core::result::AppResult;
use hrm_core::traits::KeyValueStore;

/// Stores access and refresh tokens under `access_token:<id>` and
/// `refresh_token:<id>`.
#[derive(Debug, Clone)]
pub struct SessionRegistry {
    /// Backing key-value store.
    store: Arc<dyn KeyValueStore>,
}

impl SessionRegistry {
    /// Creates a registry over `store`.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Registers the current access token, replacing any previous one.
    pub async fn put(&self, principal_id: &str, access_token: &str, ttl: Duration) -> AppResult<()> {
        self.store
            .set(&keys::access_token(principal_id), access_token, ttl)
            .await?;
        debug!(user_id = %principal_id, "Access token registered");
        Ok(())
    }

    /// Registers the current refresh token, replacing any previous one.
    pub async fn put_refresh(
        &self,
        principal_id: &str,
        refresh_token: &str,
        ttl: Duration,
    ) -> AppResult<()> {
        self.store
            .set(&keys::refresh_token(principal_id), refresh_token, ttl)
            .await?;
        debug!(user_id = %principal_id, "Refresh token registered");
        Ok(())
    }

    /// Returns the registered access token, if any.
    pub async fn get(&self, principal_id: &str) -> AppResult<Option<String>> {
        self.store.get(&keys::access_token(principal_id)).await
    }

    /// Returns the registered refresh token, if any.
    pub async fn get_refresh(&self, principal_id: &str) -> AppResult<Option<String>> {
        self.store.get(&keys::refresh_token(principal_id)).await
    }

    /// Whether `token` is the access token currently registered for `principal_id`.
    pub async fn is_current(&self, principal_id: &str, token: &str) -> AppResult<bool> {
        Ok(self.get(principal_id).await?.as_deref() == Some(token))
    }

    /// Whether `token` is the refresh token currently registered for `principal_id`.
    pub async fn is_current_refresh(&self, principal_id: &str, token: &str) -> AppResult<bool> {
        Ok(self.get_refresh(principal_id).await?.as_deref() == Some(token))
    }

    /// Deletes both registrations. Returns how many entries were removed;
    /// zero means there was nothing left to revoke.
    pub async fn revoke(&self, principal_id: &str) -> AppResult<u64> {
        let access = keys::access_token(principal_id);
        let refresh = keys::refresh_token(principal_id);
        let removed = self
            .store
            .delete(&[access.as_str(), refresh.as_str()])
            .await?;
        info!(user_id = %principal_id, removed, "Session revoked");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hrm_cache::memory::MemoryStore;

    fn registry() -> SessionRegistry {
        SessionRegistry::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_put_replaces_previous_token() {
        let registry = registry();
        registry.put("u1", "first", Duration::from_secs(60)).await.unwrap();
        registry.put("u1", "second", Duration::from_secs(60)).await.unwrap();

        assert_eq!(registry.get("u1").await.unwrap().as_deref(), Some("second"));
        assert!(!registry.is_current("u1", "first").await.unwrap());
        assert!(registry.is_current("u1", "second").await.unwrap());
    }

    #[tokio::test]
    async fn test_revoke_is_idempotent() {
        let registry = registry();
        registry.put("u1", "access", Duration::from_secs(60)).await.unwrap();
        registry
            .put_refresh("u1", "refresh", Duration::from_secs(600))
            .await
            .unwrap();

        assert_eq!(registry.revoke("u1").await.unwrap(), 2);
        assert_eq!(registry.revoke("u1").await.unwrap(), 0);
        assert_eq!(registry.get("u1").await.unwrap(), None);
        assert_eq!(registry.get_refresh("u1").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire_with_token_ttl() {
        let registry = registry();
        registry.put("u1", "access", Duration::from_secs(60)).await.unwrap();
        registry
            .put_refresh("u1", "refresh", Duration::from_secs(600))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(registry.get("u1").await.unwrap(), None);
        assert_eq!(
            registry.get_refresh("u1").await.unwrap().as_deref(),
            Some("refresh")
        );
    }
}
