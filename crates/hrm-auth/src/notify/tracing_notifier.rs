//! Development notifier that only logs deliveries.

use async_trait::async_trait;
use tracing::info;

use hrm_core::result::AppResult;
use hrm_core::traits::Notifier;

/// Logs recipient and subject instead of delivering. The body, which
/// contains the code, is never logged.
#[derive(Debug, Clone, Default)]
pub struct TracingNotifier {
    /// Sender address shown in the log line.
    from_address: String,
}

impl TracingNotifier {
    /// Creates a notifier that reports `from_address` as the sender.
    pub fn new(from_address: impl Into<String>) -> Self {
        Self {
            from_address: from_address.into(),
        }
    }
}

#[async_trait]
impl Notifier for TracingNotifier {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> AppResult<()> {
        info!(
            from = %self.from_address,
            recipient = %recipient,
            subject = %subject,
            body_len = body.len(),
            "Message handed to log notifier"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_always_succeeds() {
        let notifier = TracingNotifier::new("no-reply@hrm.local");
        notifier
            .send("erin@example.com", "Your code", "Code: 123456")
            .await
            .unwrap();

        let shared: std::sync::Arc<dyn Notifier> = std::sync::Arc::new(TracingNotifier::default());
        assert!(shared.send("mark@example.com", "Hi", "").await.is_ok());
    }
}
