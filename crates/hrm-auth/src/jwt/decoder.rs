//! JWT verification with clock-driven expiry.

use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use tracing::debug;

use hrm_core::clock::Clock;
use hrm_core::error::AppError;

use super::claims::{Claims, TokenType};

/// Uniform failure message; callers never learn which check failed.
const INVALID_TOKEN: &str = "Invalid or expired token";

/// Verifies signatures and expiry of tokens.
#[derive(Clone)]
pub struct JwtDecoder {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Signature and claim-presence checks.
    validation: Validation,
    /// Source of "now" for the expiry check.
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .field("clock", &self.clock)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates an HS256 decoder for `secret`.
    pub fn new(secret: &str, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the injected clock below.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            clock,
        }
    }

    /// Verifies signature and expiry and returns the claims.
    ///
    /// Every failure, whether a bad signature, a malformed token or an
    /// expired one, is reported as the same `InvalidCredentials` error.
    pub fn decode(&self, token: &str) -> Result<Claims, AppError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                debug!(error = %e, "Token rejected");
                AppError::invalid_credentials(INVALID_TOKEN)
            })?
            .claims;

        if claims.is_expired_at(self.clock.timestamp()) {
            debug!(sub = %claims.sub, exp = claims.exp, "Token rejected: expired");
            return Err(AppError::invalid_credentials(INVALID_TOKEN));
        }

        Ok(claims)
    }

    /// Like [`decode`](Self::decode), additionally requiring a token kind.
    pub fn decode_kind(&self, token: &str, expected: TokenType) -> Result<Claims, AppError> {
        let claims = self.decode(token)?;
        if claims.token_type != expected {
            debug!(sub = %claims.sub, got = %claims.token_type, %expected, "Token rejected: wrong kind");
            return Err(AppError::invalid_credentials(INVALID_TOKEN));
        }
        Ok(claims)
    }
}
