//! Wall-clock abstraction.
//!
//! Token expiry is checked against a [`Clock`] instead of reading the
//! system time directly, so expiry can be exercised deterministically.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};

/// Source of the current wall-clock time.
pub trait Clock: Send + Sync + std::fmt::Debug + 'static {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;

    /// Returns the current time as seconds since the Unix epoch.
    fn timestamp(&self) -> i64 {
        self.now().timestamp()
    }
}

/// Clock backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanced clock for tests and simulations.
#[derive(Debug)]
pub struct ManualClock {
    /// Time at construction.
    base: DateTime<Utc>,
    /// Milliseconds advanced since `base`.
    elapsed_ms: AtomicI64,
}

impl ManualClock {
    /// Creates a clock frozen at `base`.
    pub fn new(base: DateTime<Utc>) -> Self {
        Self {
            base,
            elapsed_ms: AtomicI64::new(0),
        }
    }

    /// Creates a clock frozen at the current system time.
    pub fn starting_now() -> Self {
        Self::new(Utc::now())
    }

    /// Moves the clock forward.
    pub fn advance(&self, duration: Duration) {
        self.elapsed_ms
            .fetch_add(duration.as_millis() as i64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.base + chrono::Duration::milliseconds(self.elapsed_ms.load(Ordering::SeqCst))
    }
}
