use std::fmt;
use std::sync::Arc;

use crate::errors::AuthError;
use crate::identity::Identity;
use crate::ports::CredentialVerifier;
use crate::ports::UserStore;
use crate::token::TokenAuthStrategy;

pub mod password;

pub use password::CachedCredential;
pub use password::PasswordAuthStrategy;

/// Credentials extracted from a request by the transport layer.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Principal name and plaintext password
    Basic { principal: String, password: String },
    /// Bearer token
    Bearer(String),
    /// Nothing recognizable was presented
    None,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Basic { principal, .. } => f
                .debug_struct("Basic")
                .field("principal", principal)
                .finish_non_exhaustive(),
            Credentials::Bearer(_) => f.write_str("Bearer(..)"),
            Credentials::None => f.write_str("None"),
        }
    }
}

/// One of the two ways a request can authenticate.
pub enum AuthStrategy<S, V>
where
    S: UserStore,
    V: CredentialVerifier,
{
    Password(Arc<PasswordAuthStrategy<S, V>>),
    Token(Arc<TokenAuthStrategy>),
}

impl<S, V> Clone for AuthStrategy<S, V>
where
    S: UserStore,
    V: CredentialVerifier,
{
    fn clone(&self) -> Self {
        match self {
            AuthStrategy::Password(strategy) => AuthStrategy::Password(Arc::clone(strategy)),
            AuthStrategy::Token(strategy) => AuthStrategy::Token(Arc::clone(strategy)),
        }
    }
}

impl<S, V> AuthStrategy<S, V>
where
    S: UserStore,
    V: CredentialVerifier,
{
    /// Authenticate the presented credentials.
    ///
    /// # Errors
    /// * `MissingCredentials` - Credentials of the wrong shape or absent
    /// * `InvalidCredentials` - Password strategy rejected the principal/password
    /// * `Token` - Token strategy rejected the bearer token
    /// * `StoredHash`, `Store`, `Internal` - Server-side failures
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<Identity, AuthError> {
        match self {
            AuthStrategy::Password(strategy) => strategy.authenticate(credentials).await,
            AuthStrategy::Token(strategy) => match credentials {
                Credentials::Bearer(token) if !token.is_empty() => Ok(strategy.validate(token)?),
                _ => Err(AuthError::MissingCredentials),
            },
        }
    }
}
