//! Integration tests for login, OTP step-up, validation, refresh and logout.

mod common;

use std::time::Duration;

use common::{PASSWORD, TestAuth};
use hrm_auth::{LoginOutcome, LogoutOutcome, TokenPair};
use hrm_core::error::ErrorKind;
use hrm_entity::user::{UserRole, UserStatus};

async fn login_tokens(auth: &TestAuth, username: &str) -> TokenPair {
    match auth.service.login(username, PASSWORD).await.unwrap() {
        LoginOutcome::Authenticated(tokens) => tokens,
        other => panic!("expected tokens, got {other:?}"),
    }
}

#[tokio::test]
async fn test_standard_login_issues_usable_tokens() {
    let auth = TestAuth::new().await;

    let tokens = login_tokens(&auth, "erin").await;
    assert!(!tokens.access_token.is_empty());
    assert!(!tokens.refresh_token.is_empty());
    assert_eq!(tokens.token_type, "bearer");

    let principal = auth
        .service
        .authenticate_header(&format!("Bearer {}", tokens.access_token))
        .await
        .unwrap();
    assert_eq!(principal.user_id, "u-employee");
    assert_eq!(principal.role, UserRole::Employee);

    assert!(auth.service.authorize(&principal, UserRole::Employee).is_ok());
    assert_eq!(
        auth.service
            .authorize(&principal, UserRole::Manager)
            .unwrap_err()
            .kind,
        ErrorKind::PermissionDenied
    );
    assert!(auth.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_admin_login_requires_mailed_code() {
    let auth = TestAuth::new().await;

    let outcome = auth.service.admin_login("alice", PASSWORD).await.unwrap();
    let LoginOutcome::OtpSent { user_id } = outcome else {
        panic!("expected OTP step-up, got {outcome:?}");
    };
    assert_eq!(user_id, "u-admin");
    // No session exists until the code is verified.
    assert_eq!(auth.service.registry().get("u-admin").await.unwrap(), None);

    let code = auth.notifier.last_code_for("alice@example.com");
    let tokens = auth.service.verify_otp(&user_id, &code).await.unwrap();
    assert!(!tokens.access_token.is_empty());
    assert!(!tokens.refresh_token.is_empty());

    let principal = auth.service.authenticate(&tokens.access_token).await.unwrap();
    assert_eq!(principal.role, UserRole::Admin);
    assert!(auth.service.authorize(&principal, UserRole::Admin).is_ok());

    // The code was consumed.
    assert_eq!(
        auth.service.verify_otp(&user_id, &code).await.unwrap_err().kind,
        ErrorKind::InvalidOtp
    );
}

#[tokio::test]
async fn test_admin_on_standard_login_is_stepped_up() {
    let auth = TestAuth::new().await;

    let outcome = auth.service.login("alice", PASSWORD).await.unwrap();
    assert_eq!(
        outcome,
        LoginOutcome::OtpSent {
            user_id: "u-admin".to_string()
        }
    );
    assert_eq!(auth.notifier.sent().len(), 1);
}

#[tokio::test]
async fn test_non_admin_admin_login_is_denied_without_code() {
    let auth = TestAuth::new().await;

    let err = auth.service.admin_login("mark", PASSWORD).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::PermissionDenied);
    assert_eq!(err.status_code(), 403);

    assert!(auth.notifier.sent().is_empty());
    assert_eq!(auth.store.get("otp:login:u-manager").await.unwrap(), None);
}

#[tokio::test]
async fn test_unknown_user_and_wrong_password_look_the_same() {
    let auth = TestAuth::new().await;

    let unknown = auth.service.login("nobody", PASSWORD).await.unwrap_err();
    let wrong = auth.service.login("erin", "not-the-password-1").await.unwrap_err();

    assert_eq!(unknown.kind, ErrorKind::InvalidCredentials);
    assert_eq!(wrong.kind, ErrorKind::InvalidCredentials);
    assert_eq!(unknown.message, wrong.message);
}

#[tokio::test]
async fn test_inactive_account_is_distinguished_from_bad_password() {
    let auth = TestAuth::new().await;
    auth.directory.set_status("u-admin", UserStatus::Inactive).await;
    auth.directory
        .set_status("u-employee", UserStatus::Inactive)
        .await;

    let err = auth.service.admin_login("alice", PASSWORD).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::AccountInactive);

    let err = auth.service.login("erin", PASSWORD).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::AccountInactive);

    // A wrong password on an inactive account is still just a bad login.
    let err = auth.service.login("erin", "wrong-password-9").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidCredentials);
}

#[tokio::test]
async fn test_wrong_otp_does_not_reveal_principal() {
    let auth = TestAuth::new().await;
    auth.service.admin_login("alice", PASSWORD).await.unwrap();

    let for_admin = auth.service.verify_otp("u-admin", "000000").await.unwrap_err();
    let for_nobody = auth.service.verify_otp("u-ghost", "000000").await.unwrap_err();
    assert_eq!(for_admin.kind, ErrorKind::InvalidOtp);
    assert_eq!(for_nobody.kind, ErrorKind::InvalidOtp);
    assert_eq!(for_admin.message, for_nobody.message);

    // One wrong guess does not consume the code.
    let code = auth.notifier.last_code_for("alice@example.com");
    assert!(auth.service.verify_otp("u-admin", &code).await.is_ok());
}

#[tokio::test]
async fn test_revocation_beats_cryptographic_validity() {
    let auth = TestAuth::new().await;
    let tokens = login_tokens(&auth, "erin").await;

    assert_eq!(
        auth.service.logout(&tokens.access_token).await.unwrap(),
        LogoutOutcome::Revoked(2)
    );

    // Still signed and unexpired, but no longer registered.
    assert!(auth.service.codec().decode(&tokens.access_token).is_ok());
    let err = auth.service.authenticate(&tokens.access_token).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::SessionExpired);

    assert_eq!(
        auth.service.logout(&tokens.access_token).await.unwrap(),
        LogoutOutcome::NothingToRevoke
    );
    assert_eq!(
        auth.service.refresh(&tokens.refresh_token).await.unwrap_err().kind,
        ErrorKind::SessionExpired
    );
}

#[tokio::test]
async fn test_new_login_supersedes_previous_session() {
    let auth = TestAuth::new().await;
    let first = login_tokens(&auth, "mark").await;
    let second = login_tokens(&auth, "mark").await;

    assert_eq!(
        auth.service
            .authenticate(&first.access_token)
            .await
            .unwrap_err()
            .kind,
        ErrorKind::SessionExpired
    );
    assert!(auth.service.authenticate(&second.access_token).await.is_ok());
}

#[tokio::test]
async fn test_expired_access_token_is_rejected() {
    let auth = TestAuth::new().await;
    let tokens = login_tokens(&auth, "erin").await;

    auth.clock.advance(Duration::from_secs(31 * 60));

    let err = auth.service.authenticate(&tokens.access_token).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::SessionExpired);
}

#[tokio::test]
async fn test_disabled_account_loses_session() {
    let auth = TestAuth::new().await;
    let tokens = login_tokens(&auth, "erin").await;

    auth.directory
        .set_status("u-employee", UserStatus::Inactive)
        .await;

    let err = auth.service.authenticate(&tokens.access_token).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::AccountInactive);
    assert_eq!(
        auth.service.refresh(&tokens.refresh_token).await.unwrap_err().kind,
        ErrorKind::AccountInactive
    );
}

#[tokio::test]
async fn test_refresh_replaces_access_token() {
    let auth = TestAuth::new().await;
    let tokens = login_tokens(&auth, "erin").await;

    auth.clock.advance(Duration::from_secs(60));
    let refreshed = auth.service.refresh(&tokens.refresh_token).await.unwrap();

    assert_ne!(refreshed.access_token, tokens.access_token);
    assert_eq!(refreshed.refresh_token, tokens.refresh_token);
    assert_eq!(refreshed.refresh_expires_at.timestamp(), tokens.refresh_expires_at.timestamp());

    assert!(auth.service.authenticate(&refreshed.access_token).await.is_ok());
    assert_eq!(
        auth.service
            .authenticate(&tokens.access_token)
            .await
            .unwrap_err()
            .kind,
        ErrorKind::SessionExpired
    );
}

#[tokio::test]
async fn test_token_kinds_are_not_interchangeable() {
    let auth = TestAuth::new().await;
    let tokens = login_tokens(&auth, "erin").await;

    assert_eq!(
        auth.service.refresh(&tokens.access_token).await.unwrap_err().kind,
        ErrorKind::InvalidCredentials
    );
    assert_eq!(
        auth.service
            .authenticate(&tokens.refresh_token)
            .await
            .unwrap_err()
            .kind,
        ErrorKind::SessionExpired
    );
}

#[tokio::test]
async fn test_refresh_rotation() {
    let auth = TestAuth::with_config(common::config(true)).await;
    let tokens = login_tokens(&auth, "erin").await;

    auth.clock.advance(Duration::from_secs(60));
    let rotated = auth.service.refresh(&tokens.refresh_token).await.unwrap();
    assert_ne!(rotated.refresh_token, tokens.refresh_token);

    assert_eq!(
        auth.service.refresh(&tokens.refresh_token).await.unwrap_err().kind,
        ErrorKind::SessionExpired
    );
    assert!(auth.service.refresh(&rotated.refresh_token).await.is_ok());
}

#[tokio::test]
async fn test_failed_delivery_surfaces_notification_error() {
    let auth = TestAuth::new().await;
    auth.notifier.fail_deliveries();

    let err = auth.service.admin_login("alice", PASSWORD).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Notification);
    assert!(!err.kind.is_domain());
}
