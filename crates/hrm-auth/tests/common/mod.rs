//! Shared test helpers for auth integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHasher as _, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use hrm_auth::{AuthSessionService, UserDirectory};
use hrm_cache::memory::MemoryStore;
use hrm_core::clock::ManualClock;
use hrm_core::config::{
    AppConfig, AuthConfig, LockConfig, LoggingConfig, MailConfig, OtpConfig, StoreConfig,
};
use hrm_core::error::AppError;
use hrm_core::result::AppResult;
use hrm_core::traits::{KeyValueStore, Notifier};
use hrm_entity::user::{User, UserRole, UserStatus};

/// Users keyed by id.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryDirectory {
    pub async fn insert(&self, user: User) {
        self.users.write().await.insert(user.id.clone(), user);
    }

    pub async fn set_status(&self, user_id: &str, status: UserStatus) {
        if let Some(user) = self.users.write().await.get_mut(user_id) {
            user.status = status;
        }
    }

    pub async fn password_hash(&self, user_id: &str) -> Option<String> {
        self.users
            .read()
            .await
            .get(user_id)
            .map(|u| u.password_hash.clone())
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_id(&self, user_id: &str) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(user_id).cloned())
    }

    async fn update_password_hash(&self, user_id: &str, password_hash: &str) -> AppResult<()> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(user_id)
            .ok_or_else(|| AppError::not_found("User not found"))?;
        user.password_hash = password_hash.to_string();
        Ok(())
    }
}

/// A message handed to the notifier.
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

/// Records messages instead of sending them; can be switched to fail.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentMessage>>,
    failing: Mutex<bool>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn fail_deliveries(&self) {
        *self.failing.lock().unwrap() = true;
    }

    /// The code in the most recent message to `recipient`.
    pub fn last_code_for(&self, recipient: &str) -> String {
        let sent = self.sent();
        let message = sent
            .iter()
            .rev()
            .find(|m| m.recipient == recipient)
            .expect("no message for recipient");
        extract_code(&message.body).expect("no code in message")
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> AppResult<()> {
        if *self.failing.lock().unwrap() {
            return Err(AppError::notification("SMTP relay unavailable"));
        }
        self.sent.lock().unwrap().push(SentMessage {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

/// First run of six digits in `body`.
pub fn extract_code(body: &str) -> Option<String> {
    body.split(|c: char| !c.is_ascii_digit())
        .find(|run| run.len() == 6)
        .map(str::to_string)
}

/// Cheap Argon2id hash so fixtures do not dominate test time.
pub fn fast_hash(password: &str) -> String {
    let params = Params::new(8, 1, 1, None).unwrap();
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
    let salt = SaltString::generate(&mut OsRng);
    argon2
        .hash_password(password.as_bytes(), &salt)
        .unwrap()
        .to_string()
}

pub fn user(id: &str, username: &str, password: &str, role: UserRole) -> User {
    User {
        id: id.to_string(),
        username: username.to_string(),
        email: Some(format!("{username}@example.com")),
        password_hash: fast_hash(password),
        role,
        status: UserStatus::Active,
        created_at: Utc::now(),
    }
}

pub fn config(rotate_refresh_tokens: bool) -> AppConfig {
    let mut auth = AuthConfig::with_secret("integration-test-secret");
    auth.rotate_refresh_tokens = rotate_refresh_tokens;
    AppConfig {
        store: StoreConfig::default(),
        auth,
        otp: OtpConfig::default(),
        lock: LockConfig::default(),
        mail: MailConfig::default(),
        logging: LoggingConfig::default(),
    }
}

pub const PASSWORD: &str = "violet-harbor-tundra-42";

/// Service plus handles on its collaborators.
pub struct TestAuth {
    pub service: AuthSessionService,
    pub store: Arc<dyn KeyValueStore>,
    pub directory: Arc<InMemoryDirectory>,
    pub notifier: Arc<RecordingNotifier>,
    pub clock: Arc<ManualClock>,
}

impl TestAuth {
    pub async fn new() -> Self {
        Self::with_config(config(false)).await
    }

    pub async fn with_config(config: AppConfig) -> Self {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let directory = Arc::new(InMemoryDirectory::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let clock = Arc::new(ManualClock::starting_now());

        directory
            .insert(user("u-admin", "alice", PASSWORD, UserRole::Admin))
            .await;
        directory
            .insert(user("u-manager", "mark", PASSWORD, UserRole::Manager))
            .await;
        directory
            .insert(user("u-employee", "erin", PASSWORD, UserRole::Employee))
            .await;

        let service = AuthSessionService::new(
            &config,
            Arc::clone(&store),
            directory.clone(),
            notifier.clone(),
            clock.clone(),
        );

        Self {
            service,
            store,
            directory,
            notifier,
            clock,
        }
    }
}
