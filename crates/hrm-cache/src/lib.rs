//! # hrm-cache
//!
//! Key-value store implementations and the distributed lock built on top
//! of them. Supports two backends:
//!
//! - **redis**: shared Redis instance via the [redis](https://crates.io/crates/redis) crate
//! - **memory**: in-process store with the same atomic semantics, for
//!   single-node deployments and tests
//!
//! The backend is selected at runtime based on configuration.

pub mod keys;
pub mod lock;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use lock::{DistributedLock, LockGuard, LockStatus};
pub use provider::StoreManager;
