use thiserror::Error;

use crate::password::HashError;
use crate::token::TokenError;

/// Error type for user store lookups.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("User store unavailable: {0}")]
    Unavailable(String),
}

/// Authentication operation errors.
///
/// Closed set of outcomes produced by the strategies and the pipeline. The
/// transport layer maps every variant to a client response.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Request missing credentials")]
    MissingCredentials,

    /// Wrong password or unknown principal. The two are never distinguished.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    /// Authenticated principal does not own the requested resource.
    #[error("Unauthorized")]
    NotResourceOwner,

    /// Stored hash for the principal is corrupt or uses an unsupported version.
    #[error("Stored password hash is unusable: {0}")]
    StoredHash(#[from] HashError),

    #[error("User store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}
