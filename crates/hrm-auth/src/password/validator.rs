//! Policy applied to passwords chosen during a reset.

use hrm_core::config::AuthConfig;
use hrm_core::error::AppError;

/// Checks candidate passwords against the configured policy.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    /// Minimum length in characters.
    min_length: usize,
}

impl PasswordValidator {
    /// Creates a validator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
        }
    }

    /// Checks that `new` and `confirm` agree, then applies the policy.
    pub fn validate_change(&self, new: &str, confirm: &str) -> Result<(), AppError> {
        if new != confirm {
            return Err(AppError::validation(
                "New password and confirmation do not match",
            ));
        }
        self.validate(new)
    }

    /// Returns the first policy violation, if any.
    pub fn validate(&self, password: &str) -> Result<(), AppError> {
        if password.chars().count() < self.min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters long",
                self.min_length
            )));
        }

        if !password.chars().any(char::is_alphabetic) {
            return Err(AppError::validation(
                "Password must contain at least one letter",
            ));
        }

        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(AppError::validation(
                "Password must contain at least one digit",
            ));
        }

        let estimate = zxcvbn::zxcvbn(password, &[]);
        if estimate.score() < zxcvbn::Score::Three {
            return Err(AppError::validation(
                "Password is too easy to guess. Use a longer or less predictable password.",
            ));
        }

        Ok(())
    }
}
