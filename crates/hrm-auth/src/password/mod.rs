//! Password hashing and the policy applied to new passwords.

pub mod hasher;
pub mod validator;

pub use hasher::PasswordHasher;
pub use validator::PasswordValidator;
