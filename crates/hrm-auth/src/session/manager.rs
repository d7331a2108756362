//! Session lifecycle: login, OTP step-up, validation, refresh, logout and
//! password reset.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use hrm_core::clock::Clock;
use hrm_core::config::{AppConfig, MailConfig};
use hrm_core::error::AppError;
use hrm_core::result::AppResult;
use hrm_core::traits::{KeyValueStore, Notifier};
use hrm_entity::principal::Principal;
use hrm_entity::user::{User, UserRole};

use crate::directory::UserDirectory;
use crate::jwt::{TokenCodec, TokenType};
use crate::notify::{login_otp_message, password_reset_message};
use crate::otp::{OtpChallenge, OtpPurpose};
use crate::password::{PasswordHasher, PasswordValidator};

use super::registry::SessionRegistry;

/// Message for unknown users and wrong passwords alike.
const BAD_LOGIN: &str = "Invalid username or password";

/// Message for every failed session validation.
const SESSION_EXPIRED: &str = "Session expired. Please log in again.";

/// Tokens handed to a client after a completed login or refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived token for protected calls.
    pub access_token: String,
    /// Long-lived token for obtaining new access tokens.
    pub refresh_token: String,
    /// Always `"bearer"`.
    pub token_type: String,
    /// Access token expiration.
    pub access_expires_at: DateTime<Utc>,
    /// Refresh token expiration.
    pub refresh_expires_at: DateTime<Utc>,
}

/// Result of a password check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Standard account: tokens issued and registered.
    Authenticated(TokenPair),
    /// Privileged account: a code was mailed, no tokens yet.
    OtpSent {
        /// Principal the code was issued for; passed back to `verify_otp`.
        user_id: String,
    },
}

/// Result of a logout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutOutcome {
    /// Registry entries were deleted.
    Revoked(u64),
    /// Already logged out.
    NothingToRevoke,
}

/// Orchestrates the per-principal session state machine.
#[derive(Clone)]
pub struct AuthSessionService {
    /// User lookups.
    directory: Arc<dyn UserDirectory>,
    /// Delivery of mailed codes.
    notifier: Arc<dyn Notifier>,
    /// Server-side token registrations.
    registry: SessionRegistry,
    /// Token signing and verification.
    codec: TokenCodec,
    /// Login and reset codes.
    otp: OtpChallenge,
    /// Password hashing.
    hasher: PasswordHasher,
    /// New-password policy.
    validator: PasswordValidator,
    /// Sender settings for mailed codes.
    mail: MailConfig,
    /// Lifetime of mailed codes, quoted in messages.
    otp_ttl: Duration,
    /// Whether refresh also replaces the refresh token.
    rotate_refresh_tokens: bool,
}

impl std::fmt::Debug for AuthSessionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSessionService")
            .field("codec", &self.codec)
            .field("otp_ttl", &self.otp_ttl)
            .field("rotate_refresh_tokens", &self.rotate_refresh_tokens)
            .finish()
    }
}

impl AuthSessionService {
    /// Wires the service from configuration and its collaborators.
    pub fn new(
        config: &AppConfig,
        store: Arc<dyn KeyValueStore>,
        directory: Arc<dyn UserDirectory>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            directory,
            notifier,
            registry: SessionRegistry::new(Arc::clone(&store)),
            codec: TokenCodec::new(&config.auth, clock),
            otp: OtpChallenge::new(store, config.otp.clone()),
            hasher: PasswordHasher::new(),
            validator: PasswordValidator::new(&config.auth),
            mail: config.mail.clone(),
            otp_ttl: config.otp.ttl(),
            rotate_refresh_tokens: config.auth.rotate_refresh_tokens,
        }
    }

    /// Token registry used by this service.
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Token codec used by this service.
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Standard login.
    ///
    /// Standard accounts receive tokens immediately. Admin accounts are
    /// stepped up: a login code is mailed and no tokens are issued until
    /// [`verify_otp`](Self::verify_otp) succeeds.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<LoginOutcome> {
        let user = self.check_credentials(username, password).await?;

        if user.is_admin() {
            return self.send_login_code(&user).await;
        }

        let tokens = self.open_session(&user).await?;
        info!(user_id = %user.id, role = %user.role, "Login successful");
        Ok(LoginOutcome::Authenticated(tokens))
    }

    /// Admin login. Non-admin accounts fail `PermissionDenied` and no code
    /// is issued.
    pub async fn admin_login(&self, username: &str, password: &str) -> AppResult<LoginOutcome> {
        let user = self.check_credentials(username, password).await?;

        if !user.is_admin() {
            warn!(user_id = %user.id, role = %user.role, "Admin login attempted by non-admin");
            return Err(AppError::permission_denied(
                "Admin privileges are required for this login",
            ));
        }

        self.send_login_code(&user).await
    }

    /// Completes an admin login with the mailed code.
    ///
    /// Fails `InvalidOtp` without revealing whether `user_id` exists.
    pub async fn verify_otp(&self, user_id: &str, code: &str) -> AppResult<TokenPair> {
        self.otp.verify(OtpPurpose::Login, user_id, code).await?;

        let user = self
            .directory
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::invalid_otp("Invalid or expired code"))?;
        ensure_active(&user)?;

        let tokens = self.open_session(&user).await?;
        info!(user_id = %user.id, "Login completed with OTP");
        Ok(tokens)
    }

    /// Validates a bearer access token and returns the caller's identity.
    ///
    /// The token must verify and must be the access token currently
    /// registered for its subject; any failure is `SessionExpired`. A valid
    /// session of a disabled account fails `AccountInactive`.
    pub async fn authenticate(&self, access_token: &str) -> AppResult<Principal> {
        let claims = self
            .codec
            .decode_kind(access_token, TokenType::Access)
            .map_err(|_| AppError::session_expired(SESSION_EXPIRED))?;

        if !self.registry.is_current(&claims.sub, access_token).await? {
            debug!(user_id = %claims.sub, "Token is not the registered session");
            return Err(AppError::session_expired(SESSION_EXPIRED));
        }

        let user = self
            .directory
            .find_by_id(&claims.sub)
            .await?
            .ok_or_else(|| AppError::session_expired(SESSION_EXPIRED))?;
        ensure_active(&user)?;

        Ok(Principal::from(&user))
    }

    /// Validates an `Authorization` header value.
    pub async fn authenticate_header(&self, header: &str) -> AppResult<Principal> {
        self.authenticate(parse_bearer(header)?).await
    }

    /// Requires `principal` to hold at least `minimum`.
    pub fn authorize(&self, principal: &Principal, minimum: UserRole) -> AppResult<()> {
        if principal.role.has_at_least(&minimum) {
            return Ok(());
        }
        warn!(user_id = %principal.user_id, role = %principal.role, required = %minimum, "Permission denied");
        Err(AppError::permission_denied(format!(
            "This action requires the {minimum} role"
        )))
    }

    /// Exchanges a refresh token for a new access token.
    ///
    /// The refresh token must verify as a refresh token and equal the one
    /// registered for its subject. With rotation enabled a new refresh
    /// token replaces it; otherwise the presented one is returned.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<TokenPair> {
        let claims = self.codec.decode_kind(refresh_token, TokenType::Refresh)?;

        if !self
            .registry
            .is_current_refresh(&claims.sub, refresh_token)
            .await?
        {
            debug!(user_id = %claims.sub, "Refresh token is not the registered one");
            return Err(AppError::session_expired(SESSION_EXPIRED));
        }

        let user = self
            .directory
            .find_by_id(&claims.sub)
            .await?
            .ok_or_else(|| AppError::session_expired(SESSION_EXPIRED))?;
        ensure_active(&user)?;

        let access = self.codec.issue_access(&user)?;
        self.registry
            .put(&user.id, &access.token, access.ttl)
            .await?;

        let (refresh_token, refresh_expires_at) = if self.rotate_refresh_tokens {
            let rotated = self.codec.issue_refresh(&user)?;
            self.registry
                .put_refresh(&user.id, &rotated.token, rotated.ttl)
                .await?;
            (rotated.token, rotated.expires_at)
        } else {
            let expires_at = claims
                .expires_at()
                .ok_or_else(|| AppError::session_expired(SESSION_EXPIRED))?;
            (refresh_token.to_string(), expires_at)
        };

        info!(user_id = %user.id, rotated = self.rotate_refresh_tokens, "Token refreshed");
        Ok(TokenPair {
            access_token: access.token,
            refresh_token,
            token_type: "bearer".to_string(),
            access_expires_at: access.expires_at,
            refresh_expires_at,
        })
    }

    /// Logs out the subject of `token`.
    ///
    /// Idempotent: a token whose session was already revoked reports
    /// `NothingToRevoke`. The token must still verify, so a forged token
    /// cannot revoke someone else's session.
    pub async fn logout(&self, token: &str) -> AppResult<LogoutOutcome> {
        let claims = self.codec.decode(token)?;
        self.revoke_sessions(&claims.sub).await
    }

    /// Revokes every registered token of `user_id`.
    pub async fn revoke_sessions(&self, user_id: &str) -> AppResult<LogoutOutcome> {
        match self.registry.revoke(user_id).await? {
            0 => Ok(LogoutOutcome::NothingToRevoke),
            removed => Ok(LogoutOutcome::Revoked(removed)),
        }
    }

    /// Mails a password reset code.
    ///
    /// Succeeds for unknown, disabled or mailbox-less accounts as well, so
    /// the reply never reveals whether a username exists.
    pub async fn forgot_password(&self, username: &str) -> AppResult<()> {
        let Some(user) = self.directory.find_by_username(username).await? else {
            debug!("Password reset requested for unknown username");
            return Ok(());
        };
        if !user.can_login() {
            debug!(user_id = %user.id, "Password reset requested for inactive account");
            return Ok(());
        }
        let Some(recipient) = user.email.as_deref() else {
            warn!(user_id = %user.id, "Password reset requested but account has no email");
            return Ok(());
        };

        let code = self.otp.issue(OtpPurpose::PasswordReset, &user.id).await?;
        let message = password_reset_message(&self.mail, &user.username, &code, self.otp_ttl);
        self.deliver(&user, recipient, &message.subject, &message.body)
            .await?;

        info!(user_id = %user.id, "Password reset code sent");
        Ok(())
    }

    /// Sets a new password using a mailed reset code, then revokes every
    /// session of the account.
    pub async fn reset_password(
        &self,
        username: &str,
        code: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> AppResult<()> {
        self.validator
            .validate_change(new_password, confirm_password)?;

        let user = self
            .directory
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::invalid_otp("Invalid or expired code"))?;
        ensure_active(&user)?;

        self.otp
            .verify(OtpPurpose::PasswordReset, &user.id, code)
            .await?;

        let password_hash = self.hasher.hash_password(new_password)?;
        self.directory
            .update_password_hash(&user.id, &password_hash)
            .await?;
        self.registry.revoke(&user.id).await?;

        info!(user_id = %user.id, "Password reset completed");
        Ok(())
    }

    /// Looks up the user and checks password and status.
    ///
    /// Unknown users and wrong passwords fail identically; the status is
    /// only reported once the password has been proven.
    async fn check_credentials(&self, username: &str, password: &str) -> AppResult<User> {
        let Some(user) = self.directory.find_by_username(username).await? else {
            debug!("Login attempt for unknown username");
            return Err(AppError::invalid_credentials(BAD_LOGIN));
        };

        if !self.hasher.verify_password(password, &user.password_hash)? {
            warn!(user_id = %user.id, "Login failed: wrong password");
            return Err(AppError::invalid_credentials(BAD_LOGIN));
        }

        ensure_active(&user)?;
        Ok(user)
    }

    /// Issues a login code and mails it.
    async fn send_login_code(&self, user: &User) -> AppResult<LoginOutcome> {
        let recipient = user.email.as_deref().ok_or_else(|| {
            AppError::notification("Account has no email address to receive a sign-in code")
        })?;

        let code = self.otp.issue(OtpPurpose::Login, &user.id).await?;
        let message = login_otp_message(&self.mail, &user.username, &code, self.otp_ttl);
        self.deliver(user, recipient, &message.subject, &message.body)
            .await?;

        info!(user_id = %user.id, "Login code sent");
        Ok(LoginOutcome::OtpSent {
            user_id: user.id.clone(),
        })
    }

    /// Sends a message; a failed delivery leaves the code to expire.
    async fn deliver(&self, user: &User, recipient: &str, subject: &str, body: &str) -> AppResult<()> {
        self.notifier
            .send(recipient, subject, body)
            .await
            .map_err(|e| {
                error!(user_id = %user.id, error = %e, "Failed to deliver code");
                e
            })
    }

    /// Issues and registers an access and refresh token for `user`.
    async fn open_session(&self, user: &User) -> AppResult<TokenPair> {
        let access = self.codec.issue_access(user)?;
        let refresh = self.codec.issue_refresh(user)?;

        self.registry
            .put(&user.id, &access.token, access.ttl)
            .await?;
        self.registry
            .put_refresh(&user.id, &refresh.token, refresh.ttl)
            .await?;

        Ok(TokenPair {
            access_token: access.token,
            refresh_token: refresh.token,
            token_type: "bearer".to_string(),
            access_expires_at: access.expires_at,
            refresh_expires_at: refresh.expires_at,
        })
    }
}

/// Extracts the credential from an `Authorization: Bearer <token>` value.
pub fn parse_bearer(header: &str) -> AppResult<&str> {
    let header = header.trim();
    let (scheme, token) = header
        .split_once(' ')
        .ok_or_else(|| AppError::invalid_credentials("Missing bearer token"))?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AppError::invalid_credentials("Unsupported authorization scheme"));
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AppError::invalid_credentials("Missing bearer token"));
    }
    Ok(token)
}

fn ensure_active(user: &User) -> AppResult<()> {
    if user.can_login() {
        Ok(())
    } else {
        warn!(user_id = %user.id, status = %user.status, "Rejected inactive account");
        Err(AppError::account_inactive("Account is disabled"))
    }
}
