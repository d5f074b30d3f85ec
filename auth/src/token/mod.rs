pub mod claims;
pub mod errors;
pub mod keyring;
pub mod strategy;

pub use claims::TokenClaims;
pub use errors::KeyringError;
pub use errors::TokenError;
pub use keyring::SecretKeyring;
pub use keyring::SigningSecret;
pub use strategy::TokenAuthStrategy;
