//! Issue and verify short-lived one-time passcodes.
//!
//! One outstanding code exists per principal and purpose; issuing again
//! overwrites it. A correct code is consumed atomically, so concurrent
//! submissions of the same code succeed at most once. Wrong guesses are
//! counted and the code is burned once the budget is spent.

use std::sync::Arc;

use tracing::{debug, info, warn};

use hrm_cache::keys;
use hrm_core::config::OtpConfig;
use hrm_core::error::AppError;
use hrm_core::result::AppResult;
use hrm_core::traits::KeyValueStore;

use super::generator::{CodeGenerator, RandomCodeGenerator};
use super::purpose::OtpPurpose;

/// Message for every verification failure, whatever the cause.
const INVALID_OTP: &str = "Invalid or expired code";

/// OTP issuance and verification backed by the key-value store.
#[derive(Debug, Clone)]
pub struct OtpChallenge {
    /// Backing key-value store.
    store: Arc<dyn KeyValueStore>,
    /// Source of codes.
    generator: Arc<dyn CodeGenerator>,
    /// TTL, width and attempt budget.
    config: OtpConfig,
}

impl OtpChallenge {
    /// Creates a challenge issuing uniformly random codes.
    pub fn new(store: Arc<dyn KeyValueStore>, config: OtpConfig) -> Self {
        Self::with_generator(store, config, Arc::new(RandomCodeGenerator))
    }

    /// Creates a challenge with a custom code source.
    pub fn with_generator(
        store: Arc<dyn KeyValueStore>,
        config: OtpConfig,
        generator: Arc<dyn CodeGenerator>,
    ) -> Self {
        Self {
            store,
            generator,
            config,
        }
    }

    /// Generates and stores a new code, superseding any outstanding one.
    pub async fn issue(&self, purpose: OtpPurpose, principal_id: &str) -> AppResult<String> {
        let code = self.generator.generate(self.config.digits);
        let code_key = keys::otp(purpose.as_str(), principal_id);
        let attempts_key = keys::otp_attempts(purpose.as_str(), principal_id);

        self.store.set(&code_key, &code, self.config.ttl()).await?;
        self.store.delete(&[attempts_key.as_str()]).await?;

        info!(user_id = %principal_id, %purpose, "OTP issued");
        Ok(code)
    }

    /// Checks `code` and consumes it on success.
    ///
    /// Fails with `InvalidOtp` when no code is outstanding, when it has
    /// expired, when `code` does not match, or when another request consumed
    /// it first. A mismatch leaves the code in place until the attempt
    /// budget is exhausted.
    pub async fn verify(&self, purpose: OtpPurpose, principal_id: &str, code: &str) -> AppResult<()> {
        let code_key = keys::otp(purpose.as_str(), principal_id);
        let attempts_key = keys::otp_attempts(purpose.as_str(), principal_id);

        let Some(stored) = self.store.get(&code_key).await? else {
            debug!(user_id = %principal_id, %purpose, "OTP verify: no outstanding code");
            return Err(AppError::invalid_otp(INVALID_OTP));
        };

        if codes_match(&stored, code) {
            if self.store.compare_and_delete(&code_key, &stored).await? == 0 {
                debug!(user_id = %principal_id, %purpose, "OTP verify: consumed concurrently");
                return Err(AppError::invalid_otp(INVALID_OTP));
            }
            self.store.delete(&[attempts_key.as_str()]).await?;
            info!(user_id = %principal_id, %purpose, "OTP verified");
            return Ok(());
        }

        let attempts = self.store.incr(&attempts_key).await?;
        if attempts == 1 {
            self.store.expire(&attempts_key, self.config.ttl()).await?;
        }

        if attempts >= i64::from(self.config.max_attempts) {
            self.store.compare_and_delete(&code_key, &stored).await?;
            self.store.delete(&[attempts_key.as_str()]).await?;
            warn!(user_id = %principal_id, %purpose, attempts, "OTP burned after too many wrong attempts");
        } else {
            debug!(user_id = %principal_id, %purpose, attempts, "OTP verify: mismatch");
        }

        Err(AppError::invalid_otp(INVALID_OTP))
    }

    /// Discards any outstanding code for `principal_id`.
    pub async fn discard(&self, purpose: OtpPurpose, principal_id: &str) -> AppResult<()> {
        let code_key = keys::otp(purpose.as_str(), principal_id);
        let attempts_key = keys::otp_attempts(purpose.as_str(), principal_id);
        self.store
            .delete(&[code_key.as_str(), attempts_key.as_str()])
            .await?;
        Ok(())
    }
}

/// Length-then-content comparison without an early exit on content.
fn codes_match(stored: &str, presented: &str) -> bool {
    stored.len() == presented.len()
        && stored
            .bytes()
            .zip(presented.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}
