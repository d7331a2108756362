//! One-time passcode issuance for support staff.

use std::sync::Arc;

use clap::{Args, Subcommand};

use hrm_auth::notify::{login_otp_message, password_reset_message};
use hrm_auth::{OtpChallenge, OtpPurpose, TracingNotifier};
use hrm_core::config::AppConfig;
use hrm_core::error::AppError;
use hrm_core::traits::Notifier;

use crate::output::{self, OutputFormat};

/// Arguments for OTP commands
#[derive(Debug, Args)]
pub struct OtpArgs {
    /// OTP subcommand
    #[command(subcommand)]
    pub command: OtpCommand,
}

/// OTP subcommands
#[derive(Debug, Subcommand)]
pub enum OtpCommand {
    /// Issue a code for a user, superseding any outstanding one
    Issue {
        /// User id
        user_id: String,
        /// What the code is for: `login` or `reset`
        #[arg(long, default_value = "login")]
        purpose: OtpPurpose,
        /// Render the message for this address and hand it to the log notifier
        #[arg(long)]
        notify: Option<String>,
    },
    /// Drop a user's outstanding code and its wrong-guess counter
    Discard {
        /// User id
        user_id: String,
        /// Which code to drop: `login` or `reset`
        #[arg(long, default_value = "login")]
        purpose: OtpPurpose,
    },
}

/// Execute OTP commands
pub async fn execute(args: &OtpArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let store = super::connect_store(config).await?;
    let otp = OtpChallenge::new(Arc::clone(&store), config.otp.clone());

    match &args.command {
        OtpCommand::Issue {
            user_id,
            purpose,
            notify,
        } => {
            let code = otp.issue(*purpose, user_id).await?;

            if let Some(recipient) = notify {
                let message = match purpose {
                    OtpPurpose::Login => login_otp_message(&config.mail, user_id, &code, config.otp.ttl()),
                    OtpPurpose::PasswordReset => {
                        password_reset_message(&config.mail, user_id, &code, config.otp.ttl())
                    }
                };
                TracingNotifier::new(config.mail.from_address.clone())
                    .send(recipient, &message.subject, &message.body)
                    .await?;
            }

            match format {
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::json!({
                        "user_id": user_id,
                        "purpose": purpose.as_str(),
                        "code": code,
                        "expires_in_seconds": config.otp.ttl_seconds,
                        "notified": notify,
                    })
                ),
                OutputFormat::Table => {
                    output::print_success(&format!("Issued {purpose} code for '{user_id}'"));
                    output::print_kv("Code", &code);
                    output::print_kv("Expires in", &format!("{}s", config.otp.ttl_seconds));
                    if let Some(recipient) = notify {
                        output::print_kv("Notified", recipient);
                    }
                }
            }
        }
        OtpCommand::Discard { user_id, purpose } => {
            otp.discard(*purpose, user_id).await?;
            match format {
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::json!({ "user_id": user_id, "purpose": purpose.as_str(), "discarded": true })
                ),
                OutputFormat::Table => {
                    output::print_success(&format!("Discarded {purpose} code for '{user_id}'"));
                }
            }
        }
    }

    Ok(())
}
