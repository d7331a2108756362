//! Token codec: stamping, signing and verifying access and refresh tokens.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use hrm_core::clock::Clock;
use hrm_core::config::AuthConfig;
use hrm_core::error::AppError;
use hrm_entity::user::User;

use super::claims::{Claims, TokenType};
use super::decoder::JwtDecoder;
use super::encoder::JwtEncoder;

/// A signed token together with the lifetime it was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Compact JWT.
    pub token: String,
    /// Lifetime used for both `exp` and the registry TTL.
    pub ttl: Duration,
    /// Absolute expiry.
    pub expires_at: DateTime<Utc>,
}

/// Encodes and decodes signed tokens.
///
/// Access and refresh tokens share the signing secret and differ in their
/// default TTL and `token_type` claim.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    /// Signing half.
    encoder: JwtEncoder,
    /// Verifying half.
    decoder: JwtDecoder,
    /// Source of `iat`.
    clock: Arc<dyn Clock>,
    /// Default access token lifetime.
    access_ttl: Duration,
    /// Default refresh token lifetime.
    refresh_ttl: Duration,
}

impl TokenCodec {
    /// Creates a codec from auth configuration.
    pub fn new(config: &AuthConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoder: JwtEncoder::new(&config.jwt_secret),
            decoder: JwtDecoder::new(&config.jwt_secret, Arc::clone(&clock)),
            clock,
            access_ttl: config.access_ttl(),
            refresh_ttl: config.refresh_ttl(),
        }
    }

    /// Stamps `iat`, `exp` and `jti` on `claims` and signs them.
    pub fn encode(&self, mut claims: Claims, ttl: Duration) -> Result<IssuedToken, AppError> {
        let now = self.clock.now();
        let lifetime = chrono::Duration::from_std(ttl)
            .map_err(|_| AppError::validation("Token lifetime out of range"))?;
        let expires_at = now + lifetime;

        claims.iat = now.timestamp();
        claims.exp = expires_at.timestamp();
        claims.jti = Uuid::new_v4().to_string();

        let token = self.encoder.sign(&claims)?;
        Ok(IssuedToken {
            token,
            ttl,
            expires_at,
        })
    }

    /// Verifies a token of any kind. Fails uniformly with `InvalidCredentials`.
    pub fn decode(&self, token: &str) -> Result<Claims, AppError> {
        self.decoder.decode(token)
    }

    /// Verifies a token and requires it to be of `kind`.
    pub fn decode_kind(&self, token: &str, kind: TokenType) -> Result<Claims, AppError> {
        self.decoder.decode_kind(token, kind)
    }

    /// Issues an access token for `user` with the default access TTL.
    pub fn issue_access(&self, user: &User) -> Result<IssuedToken, AppError> {
        self.encode(Claims::for_user(user, TokenType::Access), self.access_ttl)
    }

    /// Issues a refresh token for `user` with the default refresh TTL.
    pub fn issue_refresh(&self, user: &User) -> Result<IssuedToken, AppError> {
        self.encode(Claims::for_user(user, TokenType::Refresh), self.refresh_ttl)
    }

    /// Default access token lifetime.
    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    /// Default refresh token lifetime.
    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hrm_core::clock::ManualClock;
    use hrm_core::error::ErrorKind;

    fn codec_with(secret: &str, clock: Arc<ManualClock>) -> TokenCodec {
        TokenCodec::new(&AuthConfig::with_secret(secret), clock)
    }

    #[test]
    fn test_round_trip_then_expiry() {
        let clock = Arc::new(ManualClock::starting_now());
        let codec = codec_with("secret", Arc::clone(&clock));

        let issued = codec
            .encode(
                Claims::for_subject("u1", TokenType::Access),
                Duration::from_secs(30 * 60),
            )
            .unwrap();

        let claims = codec.decode(&issued.token).unwrap();
        assert_eq!(claims.subject(), "u1");
        assert_eq!(claims.exp - claims.iat, 30 * 60);

        clock.advance(Duration::from_secs(31 * 60));
        let err = codec.decode(&issued.token).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidCredentials);
    }

    #[test]
    fn test_bad_signature_and_expiry_are_indistinguishable() {
        let clock = Arc::new(ManualClock::starting_now());
        let codec = codec_with("secret", Arc::clone(&clock));
        let forger = codec_with("other-secret", Arc::clone(&clock));

        let forged = forger
            .encode(Claims::for_subject("u1", TokenType::Access), Duration::from_secs(60))
            .unwrap();
        let forged_err = codec.decode(&forged.token).unwrap_err();

        let genuine = codec
            .encode(Claims::for_subject("u1", TokenType::Access), Duration::from_secs(60))
            .unwrap();
        clock.advance(Duration::from_secs(61));
        let expired_err = codec.decode(&genuine.token).unwrap_err();

        assert_eq!(forged_err.kind, ErrorKind::InvalidCredentials);
        assert_eq!(expired_err.kind, forged_err.kind);
        assert_eq!(expired_err.message, forged_err.message);
    }

    #[test]
    fn test_garbage_is_invalid_credentials() {
        let codec = codec_with("secret", Arc::new(ManualClock::starting_now()));
        for token in ["", "not-a-jwt", "a.b.c"] {
            assert_eq!(
                codec.decode(token).unwrap_err().kind,
                ErrorKind::InvalidCredentials
            );
        }
    }

    #[test]
    fn test_kind_is_enforced() {
        let codec = codec_with("secret", Arc::new(ManualClock::starting_now()));
        let refresh = codec
            .encode(Claims::for_subject("u1", TokenType::Refresh), Duration::from_secs(60))
            .unwrap();

        assert!(codec.decode_kind(&refresh.token, TokenType::Refresh).is_ok());
        assert_eq!(
            codec
                .decode_kind(&refresh.token, TokenType::Access)
                .unwrap_err()
                .kind,
            ErrorKind::InvalidCredentials
        );
    }

    #[test]
    fn test_tokens_issued_together_differ() {
        let codec = codec_with("secret", Arc::new(ManualClock::starting_now()));
        let a = codec
            .encode(Claims::for_subject("u1", TokenType::Access), Duration::from_secs(60))
            .unwrap();
        let b = codec
            .encode(Claims::for_subject("u1", TokenType::Access), Duration::from_secs(60))
            .unwrap();
        assert_ne!(a.token, b.token);
    }
}
