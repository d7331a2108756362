//! One-time passcodes for privileged login and password reset.

pub mod challenge;
pub mod generator;
pub mod purpose;

pub use challenge::OtpChallenge;
pub use generator::{CodeGenerator, RandomCodeGenerator};
pub use purpose::OtpPurpose;
