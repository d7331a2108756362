//! Server-side session records and the login/refresh/logout lifecycle.

pub mod manager;
pub mod registry;

pub use manager::{AuthSessionService, LoginOutcome, LogoutOutcome, TokenPair, parse_bearer};
pub use registry::SessionRegistry;
