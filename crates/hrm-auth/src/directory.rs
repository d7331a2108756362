//! Read and password-update access to the relational user store.

use async_trait::async_trait;

use hrm_core::result::AppResult;
use hrm_entity::user::User;

/// User lookups needed by the auth flows. Implemented by the persistence
/// layer; the auth core never touches the relational store directly.
#[async_trait]
pub trait UserDirectory: Send + Sync + std::fmt::Debug + 'static {
    /// Finds a user by login name.
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Finds a user by id (a token subject).
    async fn find_by_id(&self, user_id: &str) -> AppResult<Option<User>>;

    /// Replaces the stored password hash.
    async fn update_password_hash(&self, user_id: &str, password_hash: &str) -> AppResult<()>;
}
