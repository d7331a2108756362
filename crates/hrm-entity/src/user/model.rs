//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::role::UserRole;
use super::status::UserStatus;

/// A registered employee account as seen by the session core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier, used as the token subject.
    pub id: String,
    /// Unique login name.
    pub username: String,
    /// Address OTP and reset codes are delivered to.
    pub email: Option<String>,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Privilege tier.
    pub role: UserRole,
    /// Account status.
    pub status: UserStatus,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Check if the user can authenticate right now.
    pub fn can_login(&self) -> bool {
        self.status.can_login()
    }

    /// Check if this user has admin privileges.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
