//! Key builders for every store entry the core writes.
//!
//! Centralising key construction prevents typos and makes it easy to find
//! every key the application uses. The Redis backend additionally prepends
//! its configured prefix.

use std::fmt::Display;

// ── Lock keys ──────────────────────────────────────────────

/// Store key holding the lease for a lockable resource.
pub fn lock(resource: &str) -> String {
    format!("lock:{resource}")
}

/// Lock scope for a single entity row, e.g. `application:42`.
pub fn entity_resource(entity: &str, id: impl Display) -> String {
    format!("{entity}:{id}")
}

/// Lock scope for all rows of one kind owned by a user, e.g.
/// `application:user:7` serializes leave applications filed by user 7.
pub fn user_owned_resource(entity: &str, user_id: impl Display) -> String {
    format!("{entity}:user:{user_id}")
}

// ── Session keys ───────────────────────────────────────────

/// Registered access token of a principal.
pub fn access_token(user_id: &str) -> String {
    format!("access_token:{user_id}")
}

/// Registered refresh token of a principal.
pub fn refresh_token(user_id: &str) -> String {
    format!("refresh_token:{user_id}")
}

// ── OTP keys ───────────────────────────────────────────────

/// Outstanding one-time code of a principal for a purpose.
pub fn otp(purpose: &str, user_id: &str) -> String {
    format!("otp:{purpose}:{user_id}")
}

/// Wrong-guess counter for the outstanding code.
///
/// Lives in its own namespace so no principal id can make it collide with
/// a code key.
pub fn otp_attempts(purpose: &str, user_id: &str) -> String {
    format!("otp_attempts:{purpose}:{user_id}")
}
