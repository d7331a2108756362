//! Numeric code generation.

/// Produces the numeric codes handed out by an OTP challenge.
pub trait CodeGenerator: Send + Sync + std::fmt::Debug + 'static {
    /// Returns a code of exactly `digits` decimal digits.
    fn generate(&self, digits: u32) -> String;
}

/// Uniformly random codes from the thread-local generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomCodeGenerator;

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self, digits: u32) -> String {
        let modulus = 10u32.pow(digits.clamp(1, 9));
        // Reject the tail of the u32 range so every code is equally likely.
        let limit = (u32::MAX / modulus) * modulus;
        let value = loop {
            let candidate = rand::random::<u32>();
            if candidate < limit {
                break candidate % modulus;
            }
        };
        format!("{value:0width$}", width = digits as usize)
    }
}
