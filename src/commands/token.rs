//! Token inspection.

use std::sync::Arc;

use chrono::DateTime;
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use hrm_auth::TokenCodec;
use hrm_core::clock::SystemClock;
use hrm_core::config::AppConfig;
use hrm_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for token commands
#[derive(Debug, Args)]
pub struct TokenArgs {
    /// Token subcommand
    #[command(subcommand)]
    pub command: TokenCommand,
}

/// Token subcommands
#[derive(Debug, Subcommand)]
pub enum TokenCommand {
    /// Verify a token with the configured secret and print its claims
    Inspect {
        /// Compact JWT
        token: String,
    },
}

/// Decoded claims row
#[derive(Debug, Serialize, Tabled)]
struct ClaimsRow {
    #[tabled(rename = "Subject")]
    subject: String,
    #[tabled(rename = "Username")]
    username: String,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "Type")]
    token_type: String,
    #[tabled(rename = "Issued At")]
    issued_at: String,
    #[tabled(rename = "Expires At")]
    expires_at: String,
}

/// Execute token commands
pub async fn execute(args: &TokenArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let codec = TokenCodec::new(&config.auth, Arc::new(SystemClock));

    match &args.command {
        TokenCommand::Inspect { token } => {
            let claims = codec.decode(token)?;
            output::print_item(
                &ClaimsRow {
                    subject: claims.sub.clone(),
                    username: claims.username.clone().unwrap_or_else(|| "-".to_string()),
                    role: claims
                        .role
                        .map(|r| r.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    token_type: claims.token_type.to_string(),
                    issued_at: timestamp(claims.iat),
                    expires_at: timestamp(claims.exp),
                },
                format,
            );
        }
    }

    Ok(())
}

fn timestamp(secs: i64) -> String {
    DateTime::from_timestamp(secs, 0)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| secs.to_string())
}
