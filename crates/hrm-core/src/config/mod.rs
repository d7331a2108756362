//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! optional TOML files and `HRM__`-prefixed environment variables. Each
//! sub-module represents a logical configuration section.

pub mod auth;
pub mod lock;
pub mod logging;
pub mod mail;
pub mod otp;
pub mod store;

use serde::{Deserialize, Serialize};

pub use self::auth::AuthConfig;
pub use self::lock::LockConfig;
pub use self::logging::LoggingConfig;
pub use self::mail::MailConfig;
pub use self::otp::OtpConfig;
pub use self::store::{MemoryStoreConfig, RedisStoreConfig, StoreConfig};

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Key-value store settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Token and password settings.
    pub auth: AuthConfig,
    /// One-time passcode settings.
    #[serde(default)]
    pub otp: OtpConfig,
    /// Distributed lock settings.
    #[serde(default)]
    pub lock: LockConfig,
    /// Outgoing mail settings.
    #[serde(default)]
    pub mail: MailConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration.
    ///
    /// Merges `config/default.toml`, an environment-specific overlay
    /// `config/{env}.toml` (both optional) and environment variables
    /// prefixed with `HRM__`, e.g. `HRM__AUTH__JWT_SECRET`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("HRM")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject settings no component can run with.
    pub fn validate(&self) -> Result<(), AppError> {
        self.auth.validate()?;
        self.otp.validate()?;
        self.lock.validate()?;
        Ok(())
    }
}
