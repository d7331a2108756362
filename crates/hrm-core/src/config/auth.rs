//! Authentication configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Token signing and credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Symmetric secret for JWT signing (HMAC-SHA256).
    pub jwt_secret: String,
    /// Access token TTL in minutes.
    #[serde(default = "default_access_ttl")]
    pub access_ttl_minutes: u64,
    /// Refresh token TTL in hours.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_hours: u64,
    /// Issue a new refresh token on every refresh.
    #[serde(default)]
    pub rotate_refresh_tokens: bool,
    /// Minimum password length.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
}

impl AuthConfig {
    /// Creates a configuration with default TTLs around the given secret.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: secret.into(),
            access_ttl_minutes: default_access_ttl(),
            refresh_ttl_hours: default_refresh_ttl(),
            rotate_refresh_tokens: false,
            password_min_length: default_password_min(),
        }
    }

    /// Access token lifetime.
    pub fn access_ttl(&self) -> Duration {
        Duration::from_secs(self.access_ttl_minutes * 60)
    }

    /// Refresh token lifetime.
    pub fn refresh_ttl(&self) -> Duration {
        Duration::from_secs(self.refresh_ttl_hours * 3600)
    }

    pub(crate) fn validate(&self) -> Result<(), AppError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(AppError::configuration("auth.jwt_secret must not be empty"));
        }
        if self.access_ttl_minutes == 0 || self.refresh_ttl_hours == 0 {
            return Err(AppError::configuration("auth token TTLs must be positive"));
        }
        Ok(())
    }
}

fn default_access_ttl() -> u64 {
    30
}

fn default_refresh_ttl() -> u64 {
    168
}

fn default_password_min() -> usize {
    8
}
