use thiserror::Error;

/// Error for Username validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UsernameError {
    #[error("Username missing")]
    Missing,

    #[error("Username too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },

    #[error("Username contains invalid characters (':', '/' and whitespace are not allowed)")]
    InvalidCharacters,
}

/// Top-level error for all user-related operations
#[derive(Debug, Clone, Error)]
pub enum UserError {
    // Value object validation errors (automatically converted via #[from])
    #[error("{0}")]
    InvalidUsername(#[from] UsernameError),

    #[error("Password missing")]
    MissingPassword,

    // Domain-level errors
    #[error("That username already exists")]
    UsernameAlreadyExists(String),

    // Infrastructure errors
    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}
