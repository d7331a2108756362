//! One-time passcode configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// OTP challenge settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpConfig {
    /// Lifetime of an issued code in seconds.
    #[serde(default = "default_ttl")]
    pub ttl_seconds: u64,
    /// Number of digits in a code.
    #[serde(default = "default_digits")]
    pub digits: u32,
    /// Wrong guesses allowed before the outstanding code is burned.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl(),
            digits: default_digits(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl OtpConfig {
    /// Code lifetime.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    pub(crate) fn validate(&self) -> Result<(), AppError> {
        if !(4..=9).contains(&self.digits) {
            return Err(AppError::configuration("otp.digits must be between 4 and 9"));
        }
        if self.ttl_seconds == 0 || self.max_attempts == 0 {
            return Err(AppError::configuration(
                "otp.ttl_seconds and otp.max_attempts must be positive",
            ));
        }
        Ok(())
    }
}

fn default_ttl() -> u64 {
    600
}

fn default_digits() -> u32 {
    6
}

fn default_max_attempts() -> u32 {
    5
}
