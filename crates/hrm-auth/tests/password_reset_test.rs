//! Integration tests for the forgot/reset password flow.

mod common;

use common::{PASSWORD, TestAuth};
use hrm_auth::LoginOutcome;
use hrm_core::error::ErrorKind;
use hrm_entity::user::UserStatus;

const NEW_PASSWORD: &str = "copper-lantern-meadow-77";

#[tokio::test]
async fn test_unknown_user_gets_same_reply_without_mail() {
    let auth = TestAuth::new().await;

    auth.service.forgot_password("nobody").await.unwrap();
    assert!(auth.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_reset_with_mailed_code() {
    let auth = TestAuth::new().await;
    let LoginOutcome::Authenticated(before) = auth.service.login("erin", PASSWORD).await.unwrap()
    else {
        panic!("expected tokens");
    };

    auth.service.forgot_password("erin").await.unwrap();
    let sent = auth.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient, "erin@example.com");
    assert!(sent[0].subject.contains("password reset"));

    let code = auth.notifier.last_code_for("erin@example.com");
    auth.service
        .reset_password("erin", &code, NEW_PASSWORD, NEW_PASSWORD)
        .await
        .unwrap();

    // Existing sessions are revoked.
    assert_eq!(
        auth.service
            .authenticate(&before.access_token)
            .await
            .unwrap_err()
            .kind,
        ErrorKind::SessionExpired
    );

    // Old password no longer works, new one does.
    assert_eq!(
        auth.service.login("erin", PASSWORD).await.unwrap_err().kind,
        ErrorKind::InvalidCredentials
    );
    assert!(matches!(
        auth.service.login("erin", NEW_PASSWORD).await.unwrap(),
        LoginOutcome::Authenticated(_)
    ));

    // The code is single use.
    assert_eq!(
        auth.service
            .reset_password("erin", &code, NEW_PASSWORD, NEW_PASSWORD)
            .await
            .unwrap_err()
            .kind,
        ErrorKind::InvalidOtp
    );
}

#[tokio::test]
async fn test_mismatched_confirmation_keeps_code() {
    let auth = TestAuth::new().await;
    auth.service.forgot_password("mark").await.unwrap();
    let code = auth.notifier.last_code_for("mark@example.com");
    let hash_before = auth.directory.password_hash("u-manager").await;

    let err = auth
        .service
        .reset_password("mark", &code, NEW_PASSWORD, "something-else-12")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(auth.directory.password_hash("u-manager").await, hash_before);

    auth.service
        .reset_password("mark", &code, NEW_PASSWORD, NEW_PASSWORD)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_weak_password_is_rejected() {
    let auth = TestAuth::new().await;
    auth.service.forgot_password("mark").await.unwrap();
    let code = auth.notifier.last_code_for("mark@example.com");

    let err = auth
        .service
        .reset_password("mark", &code, "password1", "password1")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_login_code_cannot_reset_password() {
    let auth = TestAuth::new().await;
    auth.service.admin_login("alice", PASSWORD).await.unwrap();
    let login_code = auth.notifier.last_code_for("alice@example.com");

    let err = auth
        .service
        .reset_password("alice", &login_code, NEW_PASSWORD, NEW_PASSWORD)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidOtp);

    // And the login code is still good for its own purpose.
    assert!(auth.service.verify_otp("u-admin", &login_code).await.is_ok());
}

#[tokio::test]
async fn test_unknown_user_reset_is_invalid_otp() {
    let auth = TestAuth::new().await;
    let err = auth
        .service
        .reset_password("nobody", "123456", NEW_PASSWORD, NEW_PASSWORD)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidOtp);
}

#[tokio::test]
async fn test_disabled_account_cannot_reset() {
    let auth = TestAuth::new().await;
    auth.service.forgot_password("erin").await.unwrap();
    let code = auth.notifier.last_code_for("erin@example.com");
    let hash_before = auth.directory.password_hash("u-employee").await;

    auth.directory
        .set_status("u-employee", UserStatus::Inactive)
        .await;

    let err = auth
        .service
        .reset_password("erin", &code, NEW_PASSWORD, NEW_PASSWORD)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::AccountInactive);
    assert_eq!(auth.directory.password_hash("u-employee").await, hash_before);

    // The code was not consumed by the rejected attempt.
    auth.directory
        .set_status("u-employee", UserStatus::Active)
        .await;
    auth.service
        .reset_password("erin", &code, NEW_PASSWORD, NEW_PASSWORD)
        .await
        .unwrap();
}
