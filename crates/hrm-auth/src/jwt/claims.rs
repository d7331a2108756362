//! JWT claims carried by access and refresh tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hrm_entity::user::{User, UserRole};

/// Claims payload embedded in every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the principal id.
    pub sub: String,
    /// Username at issuance, informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Role at issuance, informational only. Authorization reloads the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    /// Token kind.
    pub token_type: TokenType,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Unique token id, so two tokens issued in the same second differ.
    pub jti: String,
}

/// Distinguishes access tokens from refresh tokens.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Short-lived token presented on every protected call.
    Access,
    /// Long-lived token exchanged for new access tokens.
    Refresh,
}

impl TokenType {
    /// Lowercase name as it appears in the claim.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Claims {
    /// Claims for a bare subject. `iat`, `exp` and `jti` are stamped by the encoder.
    pub fn for_subject(subject: impl Into<String>, token_type: TokenType) -> Self {
        Self {
            sub: subject.into(),
            username: None,
            role: None,
            token_type,
            iat: 0,
            exp: 0,
            jti: String::new(),
        }
    }

    /// Claims describing `user`.
    pub fn for_user(user: &User, token_type: TokenType) -> Self {
        Self {
            username: Some(user.username.clone()),
            role: Some(user.role),
            ..Self::for_subject(user.id.clone(), token_type)
        }
    }

    /// Returns the principal id.
    pub fn subject(&self) -> &str {
        &self.sub
    }

    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Whether the token is expired at `now` (seconds since epoch).
    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.exp
    }
}
