//! Distributed lock inspection and release.

use std::sync::Arc;

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use hrm_cache::DistributedLock;
use hrm_core::config::AppConfig;
use hrm_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for lock commands
#[derive(Debug, Args)]
pub struct LockArgs {
    /// Lock subcommand
    #[command(subcommand)]
    pub command: LockCommand,
}

/// Lock subcommands
#[derive(Debug, Subcommand)]
pub enum LockCommand {
    /// Show the holder of a lock
    Status {
        /// Resource key, e.g. `employee:42`
        resource: String,
    },
    /// Release a lock on behalf of its holder
    Release {
        /// Resource key
        resource: String,
        /// Holder token, as shown by `lock status`
        #[arg(long)]
        token: String,
    },
    /// Delete a lock regardless of holder
    ForceRelease {
        /// Resource key
        resource: String,
    },
}

/// Lock holder row
#[derive(Debug, Serialize, Tabled)]
struct LockRow {
    #[tabled(rename = "Resource")]
    resource: String,
    #[tabled(rename = "Holder")]
    holder: String,
    #[tabled(rename = "Expires In")]
    expires_in: String,
}

/// Execute lock commands
pub async fn execute(args: &LockArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let store = super::connect_store(config).await?;
    let lock = DistributedLock::new(Arc::clone(&store), config.lock.clone());

    match &args.command {
        LockCommand::Status { resource } => match lock.status(resource).await? {
            Some(status) => output::print_item(
                &LockRow {
                    resource: resource.clone(),
                    holder: status.token,
                    expires_in: output::format_remaining(status.remaining),
                },
                format,
            ),
            None => output::print_warning(&format!("'{resource}' is not locked")),
        },
        LockCommand::Release { resource, token } => {
            if lock.release_token(resource, token).await? {
                output::print_success(&format!("Released '{resource}'"));
            } else {
                output::print_warning(&format!(
                    "'{resource}' is not held by that token; nothing released"
                ));
            }
        }
        LockCommand::ForceRelease { resource } => {
            if lock.force_release(resource).await? {
                output::print_success(&format!("Force-released '{resource}'"));
            } else {
                output::print_warning(&format!("'{resource}' is not locked"));
            }
        }
    }

    Ok(())
}
