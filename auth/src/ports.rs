use async_trait::async_trait;

use crate::errors::StoreError;
use crate::password::HashError;

/// Read access to stored credentials, owned by the surrounding application.
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    /// Retrieve the encoded password hash stored for a principal.
    ///
    /// # Returns
    /// Optional encoded hash (None if the principal does not exist)
    ///
    /// # Errors
    /// * `StoreError` - Backing store could not be queried
    async fn find_stored_hash(&self, principal: &str) -> Result<Option<String>, StoreError>;

    /// Retrieve the opaque identifier of a principal.
    ///
    /// # Returns
    /// Optional principal ID (None if the principal does not exist)
    ///
    /// # Errors
    /// * `StoreError` - Backing store could not be queried
    async fn find_principal_id(&self, principal: &str) -> Result<Option<String>, StoreError>;
}

/// Checks a plaintext password against an encoded hash.
pub trait CredentialVerifier: Send + Sync + 'static {
    /// # Returns
    /// True if the password matches, false otherwise
    ///
    /// # Errors
    /// * `HashError` - The encoded hash could not be decoded or re-derived
    fn verify(&self, password: &[u8], encoded: &str) -> Result<bool, HashError>;
}
