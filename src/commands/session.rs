//! Session inspection and revocation.

use std::sync::Arc;

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use hrm_auth::SessionRegistry;
use hrm_cache::keys;
use hrm_core::config::AppConfig;
use hrm_core::error::AppError;
use hrm_core::traits::KeyValueStore;

use crate::output::{self, OutputFormat};

/// Arguments for session commands
#[derive(Debug, Args)]
pub struct SessionArgs {
    /// Session subcommand
    #[command(subcommand)]
    pub command: SessionCommand,
}

/// Session subcommands
#[derive(Debug, Subcommand)]
pub enum SessionCommand {
    /// Show the registered tokens of a user
    Show {
        /// User id
        user_id: String,
    },
    /// Revoke every registered token of a user
    Revoke {
        /// User id
        user_id: String,
    },
}

/// One registered token
#[derive(Debug, Serialize, Tabled)]
struct SessionRow {
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Token")]
    token: String,
    #[tabled(rename = "Expires In")]
    expires_in: String,
}

/// Execute session commands
pub async fn execute(
    args: &SessionArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let store = super::connect_store(config).await?;
    let registry = SessionRegistry::new(Arc::clone(&store));

    match &args.command {
        SessionCommand::Show { user_id } => {
            let mut rows = Vec::new();
            if let Some(token) = registry.get(user_id).await? {
                rows.push(row(&store, "access", &keys::access_token(user_id), &token).await?);
            }
            if let Some(token) = registry.get_refresh(user_id).await? {
                rows.push(row(&store, "refresh", &keys::refresh_token(user_id), &token).await?);
            }
            output::print_list(&rows, format);
        }
        SessionCommand::Revoke { user_id } => match registry.revoke(user_id).await? {
            0 => output::print_warning(&format!("No session registered for '{user_id}'")),
            n => output::print_success(&format!("Revoked {n} token(s) for '{user_id}'")),
        },
    }

    Ok(())
}

async fn row(
    store: &Arc<dyn KeyValueStore>,
    kind: &'static str,
    key: &str,
    token: &str,
) -> Result<SessionRow, AppError> {
    Ok(SessionRow {
        kind,
        token: output::abbreviate(token),
        expires_in: output::format_remaining(store.ttl(key).await?),
    })
}
