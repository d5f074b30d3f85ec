use thiserror::Error;

/// Error type for password hash encoding, decoding and derivation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HashError {
    #[error("The encoded hash is not in the correct format")]
    InvalidHashFormat,

    #[error("Incompatible version of argon2: expected {expected}, found {found}")]
    IncompatibleVersion { expected: u32, found: u32 },

    #[error("Secure random source failed: {0}")]
    RandomSource(String),

    #[error("Invalid hashing parameters: {0}")]
    InvalidParameters(String),
}
