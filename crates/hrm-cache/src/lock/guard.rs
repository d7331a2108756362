//! Scoped lock ownership with background lease renewal.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use hrm_core::traits::KeyValueStore;

/// Shortest renewal period, so tiny leases do not spin.
const MIN_RENEWAL_PERIOD: Duration = Duration::from_millis(10);

/// Proof of lock ownership.
///
/// While the guard lives a background task extends the lease every half
/// lease. Call [`LockGuard::release`] to give the lock up; dropping the
/// guard without releasing stops renewal and schedules a best-effort
/// release on the current runtime.
#[derive(Debug)]
pub struct LockGuard {
    /// Store holding the lock entry.
    store: Arc<dyn KeyValueStore>,
    /// Full lock key (`lock:<resource>`).
    key: String,
    /// Random holder token stored as the key's value.
    token: String,
    /// Lease length applied on acquisition and on every renewal.
    lease: Duration,
    /// Background renewal task.
    renewal: Option<JoinHandle<()>>,
    /// Whether an explicit release already ran.
    released: bool,
}

impl LockGuard {
    /// Wraps a freshly acquired lock and starts its renewal task.
    pub(crate) fn start(
        store: Arc<dyn KeyValueStore>,
        key: String,
        token: String,
        lease: Duration,
    ) -> Self {
        let renewal = tokio::spawn(renew(Arc::clone(&store), key.clone(), lease));
        Self {
            store,
            key,
            token,
            lease,
            renewal: Some(renewal),
            released: false,
        }
    }

    /// Full store key of the lock.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Holder token written on acquisition.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Lease length.
    pub fn lease(&self) -> Duration {
        self.lease
    }

    /// Whether the renewal task is still running.
    pub fn is_renewing(&self) -> bool {
        self.renewal
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stops renewal, then deletes the lock only if this guard still owns it.
    ///
    /// Returns `true` when the lock entry was removed. A lock whose lease
    /// already expired (and may now belong to someone else) is left alone.
    /// Store errors are logged and swallowed; the lease expires on its own.
    pub async fn release(mut self) -> bool {
        self.stop_renewal().await;
        self.released = true;

        match self.store.compare_and_delete(&self.key, &self.token).await {
            Ok(removed) if removed > 0 => {
                debug!(key = %self.key, "Lock released");
                true
            }
            Ok(_) => {
                warn!(key = %self.key, "Lock no longer owned at release, lease had expired");
                false
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Lock release failed, lease will expire");
                false
            }
        }
    }

    /// Cancels the renewal task and waits for it to finish.
    pub(crate) async fn stop_renewal(&mut self) {
        if let Some(handle) = self.renewal.take() {
            handle.abort();
            // Cancellation surfaces as a JoinError, which is the expected outcome.
            let _ = handle.await;
        }
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Some(handle) = self.renewal.take() {
            handle.abort();
        }
        if self.released {
            return;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(key = %self.key, "Lock guard dropped outside a runtime, lease will expire");
            return;
        };

        let store = Arc::clone(&self.store);
        let key = std::mem::take(&mut self.key);
        let token = std::mem::take(&mut self.token);
        runtime.spawn(async move {
            match store.compare_and_delete(&key, &token).await {
                Ok(removed) if removed > 0 => debug!(key = %key, "Dropped lock guard released"),
                Ok(_) => {}
                Err(e) => warn!(key = %key, error = %e, "Dropped lock guard release failed"),
            }
        });
    }
}

/// Extends the lease every half lease until cancelled or the key is gone.
async fn renew(store: Arc<dyn KeyValueStore>, key: String, lease: Duration) {
    let period = (lease / 2).max(MIN_RENEWAL_PERIOD);
    loop {
        tokio::time::sleep(period).await;
        match store.expire(&key, lease).await {
            Ok(true) => trace!(key = %key, "Lock lease renewed"),
            Ok(false) => {
                warn!(key = %key, "Lock key vanished, stopping renewal");
                return;
            }
            Err(e) => warn!(key = %key, error = %e, "Lock renewal failed, will retry"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lock::DistributedLock;
    use crate::memory::MemoryStore;
    use hrm_core::config::LockConfig;

    fn setup() -> (Arc<dyn KeyValueStore>, DistributedLock) {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let lock = DistributedLock::new(Arc::clone(&store), LockConfig::default());
        (store, lock)
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_release_does_not_delete_new_holder() {
        let (store, lock) = setup();

        let mut first = lock
            .acquire_with_lease("employee:1", Duration::from_secs(2))
            .await
            .unwrap();
        // Simulate a stalled holder whose renewals stopped.
        first.stop_renewal().await;
        tokio::time::advance(Duration::from_secs(3)).await;

        let second = lock
            .acquire_with_lease("employee:1", Duration::from_secs(2))
            .await
            .unwrap();

        assert!(!first.release().await);
        assert_eq!(
            store.get("lock:employee:1").await.unwrap().as_deref(),
            Some(second.token())
        );
        assert!(second.release().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_renewal_stops_when_key_vanishes() {
        let (store, lock) = setup();

        let guard = lock
            .acquire_with_lease("employee:2", Duration::from_secs(2))
            .await
            .unwrap();
        assert!(guard.is_renewing());

        store.delete(&["lock:employee:2"]).await.unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert!(!guard.is_renewing());
        assert!(!guard.release().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_releases_in_background() {
        let (store, lock) = setup();

        let guard = lock.acquire("employee:3").await.unwrap();
        drop(guard);
        tokio::task::yield_now().await;

        assert_eq!(store.get("lock:employee:3").await.unwrap(), None);
    }
}
