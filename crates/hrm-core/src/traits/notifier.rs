//! Out-of-band delivery of codes to a principal.

use async_trait::async_trait;

use crate::result::AppResult;

/// Notification collaborator (email, SMS, ...).
///
/// Delivery is attempted synchronously: callers only report "code sent"
/// after `send` returns `Ok`.
#[async_trait]
pub trait Notifier: Send + Sync + std::fmt::Debug + 'static {
    /// Deliver a rendered message to `recipient`.
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> AppResult<()>;
}
