use thiserror::Error;

/// Error type for token issuance and validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Malformed token")]
    Malformed,

    #[error("Token missing key id")]
    MissingKeyId,

    /// Bad signature, unknown key id or a not-before time in the future.
    #[error("Invalid token")]
    Invalid,

    #[error("Failed to sign token: {0}")]
    SigningFailed(String),
}

/// Error type for keyring construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyringError {
    #[error("Active key id is not in the keyring: {0}")]
    MissingActiveKey(String),

    #[error("Unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Signing secret must not be empty")]
    EmptySecret,
}
