//! The authenticated identity attached to a request.

use serde::{Deserialize, Serialize};

use crate::user::{User, UserRole};

/// Identity resolved from a validated session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// User identifier (token subject).
    pub user_id: String,
    /// Login name.
    pub username: String,
    /// Role as currently stored, not as recorded in the token.
    pub role: UserRole,
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id.clone(),
            username: user.username.clone(),
            role: user.role,
        }
    }
}
