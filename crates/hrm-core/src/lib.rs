//! # hrm-core
//!
//! Core crate for the HRM concurrency-and-session core. Contains the
//! configuration schemas, the unified error system, the clock abstraction
//! and the boundary traits every other crate is written against:
//!
//! - [`traits::KeyValueStore`]: the Redis-like store that owns locks,
//!   sessions and OTP challenges
//! - [`traits::Notifier`]: out-of-band delivery of codes (email, SMS)
//!
//! This crate has **no** internal dependencies on other HRM crates.

pub mod clock;
pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{AppError, ErrorKind};
pub use result::AppResult;
