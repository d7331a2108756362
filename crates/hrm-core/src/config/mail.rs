//! Outgoing mail configuration.

use serde::{Deserialize, Serialize};

/// Sender identity used when rendering notification messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// Sender address.
    #[serde(default = "default_from")]
    pub from_address: String,
    /// Product name shown in message subjects and bodies.
    #[serde(default = "default_product")]
    pub product_name: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            from_address: default_from(),
            product_name: default_product(),
        }
    }
}

fn default_from() -> String {
    "no-reply@hrm.local".to_string()
}

fn default_product() -> String {
    "HR Management".to_string()
}
