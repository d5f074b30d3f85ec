use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::user::errors::UserError;
use crate::user::errors::UsernameError;

/// User aggregate entity.
///
/// Represents a registered principal and its stored password hash
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID.
    ///
    /// # Returns
    /// UserId with random UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Username value type
///
/// Non-empty and free of characters that cannot travel in a basic
/// credential or a path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    const MAX_LENGTH: usize = 64;

    /// Create a new valid username.
    ///
    /// # Arguments
    /// * `username` - Raw username string
    ///
    /// # Returns
    /// Validated Username value object
    ///
    /// # Errors
    /// * `Missing` - Username is empty
    /// * `TooLong` - Username longer than 64 characters
    /// * `InvalidCharacters` - Contains ':', '/' or whitespace
    pub fn new(username: String) -> Result<Self, UsernameError> {
        if username.is_empty() {
            return Err(UsernameError::Missing);
        }

        let length = username.chars().count();
        if length > Self::MAX_LENGTH {
            return Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            });
        }

        if username
            .chars()
            .any(|c| c == ':' || c == '/' || c.is_whitespace())
        {
            return Err(UsernameError::InvalidCharacters);
        }

        Ok(Self(username))
    }

    /// Get username as string slice.
    ///
    /// # Returns
    /// Username string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Command to register a new user with domain types
pub struct RegisterUserCommand {
    pub username: Username,
    pub password: String,
}

impl RegisterUserCommand {
    /// Construct a new register command.
    ///
    /// # Arguments
    /// * `username` - Validated username
    /// * `password` - Plain text password (will be hashed by service)
    ///
    /// # Errors
    /// * `MissingPassword` - Password is empty
    pub fn new(username: Username, password: String) -> Result<Self, UserError> {
        if password.is_empty() {
            return Err(UserError::MissingPassword);
        }
        Ok(Self { username, password })
    }
}

impl fmt::Debug for RegisterUserCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterUserCommand")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_validation() {
        assert!(Username::new("test".to_string()).is_ok());
        assert!(Username::new("élodie_42".to_string()).is_ok());
        assert_eq!(Username::new(String::new()), Err(UsernameError::Missing));
        assert_eq!(
            Username::new("a:b".to_string()),
            Err(UsernameError::InvalidCharacters)
        );
        assert_eq!(
            Username::new("a/b".to_string()),
            Err(UsernameError::InvalidCharacters)
        );
        assert_eq!(
            Username::new("a".repeat(65)),
            Err(UsernameError::TooLong {
                max: 64,
                actual: 65
            })
        );
    }

    #[test]
    fn test_register_command_requires_password() {
        let username = Username::new("test".to_string()).unwrap();
        assert!(matches!(
            RegisterUserCommand::new(username, String::new()),
            Err(UserError::MissingPassword)
        ));
    }

    #[test]
    fn test_register_command_debug_hides_password() {
        let username = Username::new("test".to_string()).unwrap();
        let command = RegisterUserCommand::new(username, "hunter2".to_string()).unwrap();
        assert!(!format!("{:?}", command).contains("hunter2"));
    }
}
