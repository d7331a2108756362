//! Unified application error types.
//!
//! Every crate maps its internal errors into [`AppError`] so that failures
//! propagate with `?` and every consumer switches on the closed
//! [`ErrorKind`] set.

use std::fmt;
use thiserror::Error;

/// Error kind categorization used across the entire core.
///
/// The first six variants are the domain taxonomy surfaced to callers
/// verbatim; the rest are infrastructure failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// A distributed lock could not be acquired within the attempt budget.
    ResourceLocked,
    /// Bad password, or a token failed its signature/expiry check.
    InvalidCredentials,
    /// The token is not (or no longer) the registered session for its subject.
    SessionExpired,
    /// A one-time code was missing, expired, burned or mismatched.
    InvalidOtp,
    /// The principal exists but its account is disabled.
    AccountInactive,
    /// The principal lacks the required privilege tier.
    PermissionDenied,
    /// Input validation failed.
    Validation,
    /// The requested resource was not found.
    NotFound,
    /// The key-value store could not be reached or returned an error.
    Store,
    /// The notification collaborator failed to deliver a message.
    Notification,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal error occurred.
    Internal,
}

impl ErrorKind {
    /// Protocol status typically surfaced for this kind.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::ResourceLocked => 409,
            Self::InvalidCredentials | Self::SessionExpired => 401,
            Self::InvalidOtp | Self::Validation => 400,
            Self::AccountInactive | Self::PermissionDenied => 403,
            Self::NotFound => 404,
            Self::Notification => 502,
            Self::Store | Self::Configuration | Self::Serialization | Self::Internal => 500,
        }
    }

    /// Whether this kind belongs to the domain taxonomy rather than infrastructure.
    pub fn is_domain(&self) -> bool {
        matches!(
            self,
            Self::ResourceLocked
                | Self::InvalidCredentials
                | Self::SessionExpired
                | Self::InvalidOtp
                | Self::AccountInactive
                | Self::PermissionDenied
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResourceLocked => write!(f, "RESOURCE_LOCKED"),
            Self::InvalidCredentials => write!(f, "INVALID_CREDENTIALS"),
            Self::SessionExpired => write!(f, "SESSION_EXPIRED"),
            Self::InvalidOtp => write!(f, "INVALID_OTP"),
            Self::AccountInactive => write!(f, "ACCOUNT_INACTIVE"),
            Self::PermissionDenied => write!(f, "PERMISSION_DENIED"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Store => write!(f, "STORE"),
            Self::Notification => write!(f, "NOTIFICATION"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error.
///
/// Crate-specific errors are mapped into `AppError` using `From` impls or
/// explicit `.map_err()` calls.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a resource-locked error.
    pub fn resource_locked(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ResourceLocked, message)
    }

    /// Create an invalid-credentials error.
    pub fn invalid_credentials(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidCredentials, message)
    }

    /// Create a session-expired error.
    pub fn session_expired(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SessionExpired, message)
    }

    /// Create an invalid-OTP error.
    pub fn invalid_otp(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidOtp, message)
    }

    /// Create an account-inactive error.
    pub fn account_inactive(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AccountInactive, message)
    }

    /// Create a permission-denied error.
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PermissionDenied, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a store error.
    pub fn store(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Store, message)
    }

    /// Create a notification error.
    pub fn notification(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Notification, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Shorthand for `self.kind.status_code()`.
    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Internal, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
