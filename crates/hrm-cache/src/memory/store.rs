//! In-memory store implementation using DashMap.
//!
//! Deadlines are measured with [`tokio::time::Instant`], so paused and
//! advanced time in tests drives expiry exactly like wall time does in
//! production. Expired entries are removed on access, and a full sweep
//! runs every `sweep_every_writes` writes so keys that are never read
//! again do not accumulate. There is no capacity bound beyond that.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::time::Instant;
use tracing::debug;

use hrm_core::config::MemoryStoreConfig;
use hrm_core::error::AppError;
use hrm_core::result::AppResult;
use hrm_core::traits::KeyValueStore;

/// Shortest TTL kept, matching the millisecond floor of the Redis backend.
const MIN_TTL: Duration = Duration::from_millis(1);

/// A stored value and its optional deadline.
#[derive(Debug, Clone)]
struct StoredValue {
    value: String,
    expires_at: Option<Instant>,
}

impl StoredValue {
    fn new(value: impl Into<String>, ttl: Option<Duration>, now: Instant) -> Self {
        Self {
            value: value.into(),
            expires_at: ttl.map(|ttl| now + ttl.max(MIN_TTL)),
        }
    }

    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|deadline| deadline > now)
    }
}

/// In-memory key-value store.
///
/// Every operation touches a single DashMap shard under its lock, which
/// makes `set_nx` and `compare_and_delete` atomic within the process.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    entries: Arc<DashMap<String, StoredValue>>,
    writes: Arc<AtomicU64>,
    sweep_every: u64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::from_config(&MemoryStoreConfig::default())
    }
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store from configuration.
    pub fn from_config(config: &MemoryStoreConfig) -> Self {
        Self {
            entries: Arc::new(DashMap::with_capacity(config.initial_capacity)),
            writes: Arc::new(AtomicU64::new(0)),
            sweep_every: config.sweep_every_writes.max(1),
        }
    }

    /// Number of entries held, expired ones included until they are swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every expired entry and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, v| v.is_live(now));
        before.saturating_sub(self.entries.len())
    }

    /// Counts a write and sweeps when the interval is reached. Must not be
    /// called while a shard guard is held.
    fn note_write(&self) {
        let writes = self.writes.fetch_add(1, Ordering::Relaxed) + 1;
        if writes % self.sweep_every == 0 {
            let removed = self.purge_expired();
            if removed > 0 {
                debug!(removed, "Swept expired entries");
            }
        }
    }

    fn evict_if_expired(&self, key: &str, now: Instant) {
        self.entries.remove_if(key, |_, v| !v.is_live(now));
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let now = Instant::now();
        let expired = match self.entries.get(key) {
            Some(entry) if entry.is_live(now) => return Ok(Some(entry.value.clone())),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.evict_if_expired(key, now);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        let now = Instant::now();
        self.entries
            .insert(key.to_string(), StoredValue::new(value, Some(ttl), now));
        self.note_write();
        Ok(())
    }

    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool> {
        let now = Instant::now();
        let inserted = match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_live(now) {
                    false
                } else {
                    occupied.insert(StoredValue::new(value, Some(ttl), now));
                    true
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(StoredValue::new(value, Some(ttl), now));
                true
            }
        };
        if inserted {
            self.note_write();
        }
        Ok(inserted)
    }

    async fn delete(&self, keys: &[&str]) -> AppResult<u64> {
        let now = Instant::now();
        let mut removed = 0;
        for key in keys {
            if let Some((_, value)) = self.entries.remove(*key) {
                if value.is_live(now) {
                    removed += 1;
                }
            }
        }
        Ok(removed)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> AppResult<bool> {
        let now = Instant::now();
        let renewed = match self.entries.get_mut(key) {
            Some(mut entry) if entry.is_live(now) => {
                entry.expires_at = Some(now + ttl.max(MIN_TTL));
                true
            }
            _ => false,
        };
        if !renewed {
            self.evict_if_expired(key, now);
        }
        Ok(renewed)
    }

    async fn compare_and_delete(&self, key: &str, expected: &str) -> AppResult<u64> {
        let now = Instant::now();
        let removed = self
            .entries
            .remove_if(key, |_, v| v.is_live(now) && v.value == expected);
        if removed.is_some() {
            return Ok(1);
        }
        self.evict_if_expired(key, now);
        Ok(0)
    }

    async fn incr(&self, key: &str) -> AppResult<i64> {
        let now = Instant::now();
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) if occupied.get().is_live(now) => {
                let current: i64 = occupied.get().value.parse().map_err(|_| {
                    AppError::store(format!("Value at '{key}' is not an integer"))
                })?;
                let next = current + 1;
                occupied.get_mut().value = next.to_string();
                Ok(next)
            }
            Entry::Occupied(mut occupied) => {
                occupied.insert(StoredValue::new("1", None, now));
                Ok(1)
            }
            Entry::Vacant(vacant) => {
                vacant.insert(StoredValue::new("1", None, now));
                Ok(1)
            }
        }
    }

    async fn ttl(&self, key: &str) -> AppResult<Option<Duration>> {
        let now = Instant::now();
        Ok(self.entries.get(key).and_then(|entry| {
            if !entry.is_live(now) {
                return None;
            }
            entry.expires_at.map(|deadline| deadline - now)
        }))
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
