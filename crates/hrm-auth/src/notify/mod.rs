//! Outbound messages carrying OTP codes.

pub mod templates;
pub mod tracing_notifier;

pub use templates::{RenderedMessage, login_otp_message, password_reset_message};
pub use tracing_notifier::TracingNotifier;
