//! What an OTP was issued for.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use hrm_core::error::AppError;

/// Namespaces codes so a reset code never works as a login factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpPurpose {
    /// Second factor of a privileged login.
    Login,
    /// Proof of mailbox ownership for a password reset.
    PasswordReset,
}

impl OtpPurpose {
    /// Key segment for this purpose.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::PasswordReset => "reset",
        }
    }
}

impl std::fmt::Display for OtpPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OtpPurpose {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "login" => Ok(Self::Login),
            "reset" | "password_reset" => Ok(Self::PasswordReset),
            _ => Err(AppError::validation(format!("Unknown OTP purpose: {s}"))),
        }
    }
}
