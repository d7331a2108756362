//! CLI command definitions and dispatch.

pub mod health;
pub mod lock;
pub mod otp;
pub mod session;
pub mod token;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use hrm_cache::StoreManager;
use hrm_core::config::AppConfig;
use hrm_core::error::AppError;
use hrm_core::traits::KeyValueStore;

use crate::output::OutputFormat;

/// HR management session core administration
#[derive(Debug, Parser)]
#[command(name = "hrm-admin", version, about, long_about = None)]
pub struct Cli {
    /// Configuration environment (selects config/<env>.toml)
    #[arg(short, long, env = "HRM_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check connectivity to the key-value store
    Health,
    /// Inspect or revoke a user's session
    Session(session::SessionArgs),
    /// Inspect or release distributed locks
    Lock(lock::LockArgs),
    /// Decode and verify a token
    Token(token::TokenArgs),
    /// Issue one-time passcodes for support cases
    Otp(otp::OtpArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Health => health::execute(&config, self.format).await,
            Commands::Session(args) => session::execute(args, &config, self.format).await,
            Commands::Lock(args) => lock::execute(args, &config, self.format).await,
            Commands::Token(args) => token::execute(args, &config, self.format).await,
            Commands::Otp(args) => otp::execute(args, &config, self.format).await,
        }
    }
}

/// Helper: connect to the configured key-value store
pub async fn connect_store(config: &AppConfig) -> Result<Arc<dyn KeyValueStore>, AppError> {
    let manager = StoreManager::new(&config.store).await?;
    Ok(manager.shared())
}
