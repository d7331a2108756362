//! Distributed lock configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Lease and retry settings for the distributed lock.
///
/// Acquisition is bounded by attempt count, not by a wall-clock deadline:
/// the worst-case wait is `(max_attempts - 1) * retry_delay_ms`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockConfig {
    /// Default lease in seconds.
    #[serde(default = "default_lease")]
    pub lease_seconds: u64,
    /// Number of `SET NX` attempts before giving up.
    #[serde(default = "default_attempts")]
    pub max_attempts: u32,
    /// Fixed delay between attempts in milliseconds.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            lease_seconds: default_lease(),
            max_attempts: default_attempts(),
            retry_delay_ms: default_retry_delay(),
        }
    }
}

impl LockConfig {
    /// Default lease duration.
    pub fn lease(&self) -> Duration {
        Duration::from_secs(self.lease_seconds)
    }

    /// Delay between acquisition attempts.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub(crate) fn validate(&self) -> Result<(), AppError> {
        if self.lease_seconds == 0 {
            return Err(AppError::configuration("lock.lease_seconds must be positive"));
        }
        if self.max_attempts == 0 {
            return Err(AppError::configuration("lock.max_attempts must be at least 1"));
        }
        Ok(())
    }
}

fn default_lease() -> u64 {
    10
}

fn default_attempts() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    1000
}
