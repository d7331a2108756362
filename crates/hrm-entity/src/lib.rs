//! # hrm-entity
//!
//! Domain models the session core reads from the relational user store,
//! plus the [`Principal`] value produced by a successful authentication.
//! Entity CRUD itself lives outside this workspace.

pub mod principal;
pub mod user;

pub use principal::Principal;
pub use user::{User, UserRole, UserStatus};
