//! JWT signing.

use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};

use hrm_core::error::{AppError, ErrorKind};

use super::claims::Claims;

/// Signs claims with the process-wide HMAC secret.
#[derive(Clone)]
pub struct JwtEncoder {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// Header with the signing algorithm.
    header: Header,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("alg", &self.header.alg)
            .finish()
    }
}

impl JwtEncoder {
    /// Creates an HS256 encoder for `secret`.
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            header: Header::new(Algorithm::HS256),
        }
    }

    /// Serializes and signs fully stamped claims.
    pub fn sign(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&self.header, claims, &self.encoding_key).map_err(|e| {
            AppError::with_source(
                ErrorKind::Internal,
                format!("Failed to encode {} token", claims.token_type),
                e,
            )
        })
    }
}
