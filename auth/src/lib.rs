//! Credential verification and session token library
//!
//! Provides the authentication core used by the API service:
//! - Password hashing in a self-describing Argon2id format
//! - Password strategy with a short-lived cache of verified principals
//! - Signed bearer tokens checked against a rotatable keyring
//! - A pipeline that routes each endpoint to the strategy it requires
//!
//! Persistence stays outside this crate. Services implement [`UserStore`] over
//! whatever holds their users.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::{CredentialVerifier, HashingParameters, PasswordHasher};
//!
//! let hasher = PasswordHasher::new(HashingParameters {
//!     memory_cost_kib: 1024,
//!     iterations: 1,
//!     parallelism: 1,
//!     ..Default::default()
//! });
//! let hash = hasher.hash("hunter2").unwrap();
//! assert!(hash.starts_with("$argon2id$v=19$"));
//! assert!(hasher.verify(b"hunter2", &hash).unwrap());
//! assert!(!hasher.verify(b"wrong", &hash).unwrap());
//! ```
//!
//! ## Session Tokens
//! ```
//! use std::sync::Arc;
//!
//! use auth::{Identity, SecretKeyring, SigningSecret, SystemClock, TokenAuthStrategy};
//! use jsonwebtoken::Algorithm;
//!
//! let secret = SigningSecret::hmac(b"secret_key_at_least_32_bytes_long!", Algorithm::HS256).unwrap();
//! let tokens = TokenAuthStrategy::new(SecretKeyring::new("secret-id", secret), Arc::new(SystemClock));
//!
//! let token = tokens.issue(&Identity::new("alice", "1")).unwrap();
//! let identity = tokens.validate(&token).unwrap();
//! assert_eq!(identity.principal_name(), "alice");
//! ```

pub mod cache;
pub mod clock;
pub mod errors;
pub mod identity;
pub mod password;
pub mod pipeline;
pub mod ports;
pub mod strategy;
pub mod token;

#[cfg(test)]
mod testutil;

// Re-export commonly used items
pub use cache::AuthCache;
pub use clock::Clock;
pub use clock::ManualClock;
pub use clock::SystemClock;
pub use errors::AuthError;
pub use errors::StoreError;
pub use identity::Identity;
pub use password::HashError;
pub use password::HashingParameters;
pub use password::PasswordHasher;
pub use pipeline::AuthPipeline;
pub use pipeline::EndpointPolicy;
pub use ports::CredentialVerifier;
pub use ports::UserStore;
pub use strategy::AuthStrategy;
pub use strategy::Credentials;
pub use strategy::PasswordAuthStrategy;
pub use token::KeyringError;
pub use token::SecretKeyring;
pub use token::SigningSecret;
pub use token::TokenAuthStrategy;
pub use token::TokenError;
