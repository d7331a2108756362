//! Lock acquisition with bounded, non-fair retries.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};
use uuid::Uuid;

use hrm_core::config::LockConfig;
use hrm_core::error::AppError;
use hrm_core::result::AppResult;
use hrm_core::traits::KeyValueStore;

use super::guard::LockGuard;
use crate::keys;

/// Current holder of a lock, as seen by an operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockStatus {
    /// Holder token stored under the lock key.
    pub token: String,
    /// Remaining lease, if the store reports one.
    pub remaining: Option<Duration>,
}

/// Acquires named leases backed by the key-value store.
///
/// Waiters are not queued: every attempt is an independent `SET NX`, and
/// whichever attempt lands first after the key disappears wins.
#[derive(Debug, Clone)]
pub struct DistributedLock {
    /// Store holding the lock entries.
    store: Arc<dyn KeyValueStore>,
    /// Lease and retry settings.
    config: LockConfig,
}

impl DistributedLock {
    /// Creates a lock manager over the given store.
    pub fn new(store: Arc<dyn KeyValueStore>, config: LockConfig) -> Self {
        Self { store, config }
    }

    /// Acquires `resource` with the configured default lease.
    pub async fn acquire(&self, resource: &str) -> AppResult<LockGuard> {
        self.acquire_with_lease(resource, self.config.lease()).await
    }

    /// Acquires `resource` with an explicit lease.
    ///
    /// Makes up to `max_attempts` attempts separated by `retry_delay`, then
    /// fails with `ResourceLocked`. Store transport errors are returned
    /// immediately and do not consume the attempt budget. A zero lease is
    /// rejected.
    pub async fn acquire_with_lease(&self, resource: &str, lease: Duration) -> AppResult<LockGuard> {
        if lease.is_zero() {
            return Err(AppError::validation("Lock lease must be greater than zero"));
        }
        let key = keys::lock(resource);
        let token = Uuid::new_v4().to_string();
        let max_attempts = self.config.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            if self.store.set_nx(&key, &token, lease).await? {
                debug!(key = %key, attempt, "Lock acquired");
                return Ok(LockGuard::start(Arc::clone(&self.store), key, token, lease));
            }

            if attempt < max_attempts {
                debug!(key = %key, attempt, "Lock busy, retrying");
                tokio::time::sleep(self.config.retry_delay()).await;
            }
        }

        warn!(key = %key, attempts = max_attempts, "Lock acquisition exhausted");
        Err(AppError::resource_locked(
            "Resource is locked. Please try again later.",
        ))
    }

    /// Runs `operation` while holding `resource`.
    ///
    /// The lock is released on every exit path: after success, after an
    /// error returned by `operation`, and (via the guard's `Drop`) when the
    /// future is cancelled or panics. Entity services wrap their mutations
    /// in this instead of handling guards themselves.
    pub async fn with_lock<T, F, Fut>(&self, resource: &str, operation: F) -> AppResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let guard = self.acquire(resource).await?;
        let result = operation().await;
        guard.release().await;
        result
    }

    /// Reports the current holder of `resource`, if any.
    pub async fn status(&self, resource: &str) -> AppResult<Option<LockStatus>> {
        let key = keys::lock(resource);
        let Some(token) = self.store.get(&key).await? else {
            return Ok(None);
        };
        let remaining = self.store.ttl(&key).await?;
        Ok(Some(LockStatus { token, remaining }))
    }

    /// Releases `resource` on behalf of the holder identified by `token`.
    ///
    /// Returns `false` when the lock is held by someone else or not at all.
    pub async fn release_token(&self, resource: &str, token: &str) -> AppResult<bool> {
        let key = keys::lock(resource);
        let removed = self.store.compare_and_delete(&key, token).await?;
        Ok(removed > 0)
    }

    /// Deletes the lock regardless of holder. Operator escape hatch only.
    pub async fn force_release(&self, resource: &str) -> AppResult<bool> {
        let key = keys::lock(resource);
        let removed = self.store.delete(&[key.as_str()]).await?;
        if removed > 0 {
            info!(key = %key, "Lock force-released");
        }
        Ok(removed > 0)
    }
}
