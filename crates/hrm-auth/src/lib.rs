//! # hrm-auth
//!
//! Authentication and session management for the HR management API.
//!
//! ## Modules
//!
//! - `jwt`: signed access and refresh tokens with clock-driven expiry
//! - `session`: server-side token registry and the login/refresh/logout service
//! - `otp`: one-time passcodes for admin sign-in and password reset
//! - `password`: Argon2id hashing and the new-password policy
//! - `notify`: message templates and a logging notifier
//! - `directory`: the user lookup boundary

pub mod directory;
pub mod jwt;
pub mod notify;
pub mod otp;
pub mod password;
pub mod session;

pub use directory::UserDirectory;
pub use jwt::{Claims, TokenCodec, TokenType};
pub use notify::TracingNotifier;
pub use otp::{OtpChallenge, OtpPurpose};
pub use password::{PasswordHasher, PasswordValidator};
pub use session::{
    AuthSessionService, LoginOutcome, LogoutOutcome, SessionRegistry, TokenPair, parse_bearer,
};
