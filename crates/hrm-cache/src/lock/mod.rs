//! Distributed mutual exclusion over the key-value store.
//!
//! A lock is a store entry `lock:<resource>` whose value is a random token
//! identifying the holder. Acquisition is `SET NX` with a lease, a
//! background task renews the lease at half its interval while the guard
//! lives, and release is an ownership-checked compare-and-delete. A holder
//! that dies stops renewing, so its lease self-expires.
//!
//! The lock is advisory: callers must take the lock matching a resource
//! before mutating it.

pub mod guard;
pub mod manager;

pub use guard::LockGuard;
pub use manager::{DistributedLock, LockStatus};
