//! Message bodies for mailed codes.

use std::time::Duration;

use hrm_core::config::MailConfig;

/// Subject and body ready for a [`Notifier`](hrm_core::traits::Notifier).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
}

/// Login second-factor message.
pub fn login_otp_message(mail: &MailConfig, username: &str, code: &str, ttl: Duration) -> RenderedMessage {
    RenderedMessage {
        subject: format!("{} sign-in code", mail.product_name),
        body: format!(
            "Hello {username},\n\n\
             Your sign-in code is {code}. It expires in {minutes} minutes.\n\n\
             If you did not try to sign in, change your password.\n",
            minutes = minutes(ttl),
        ),
    }
}

/// Password reset message.
pub fn password_reset_message(mail: &MailConfig, username: &str, code: &str, ttl: Duration) -> RenderedMessage {
    RenderedMessage {
        subject: format!("{} password reset code", mail.product_name),
        body: format!(
            "Hello {username},\n\n\
             Use the code {code} to reset your password. It expires in {minutes} minutes.\n\n\
             If you did not ask for a reset, you can ignore this message.\n",
            minutes = minutes(ttl),
        ),
    }
}

fn minutes(ttl: Duration) -> u64 {
    ttl.as_secs().div_ceil(60)
}
