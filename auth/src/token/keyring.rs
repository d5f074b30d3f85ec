use std::collections::HashMap;
use std::fmt;

use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;

use super::errors::KeyringError;

/// Shared secret and HMAC algorithm for one key id.
#[derive(Clone)]
pub struct SigningSecret {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl SigningSecret {
    /// Create an HMAC signing secret.
    ///
    /// # Security Notes
    /// - The secret should be at least as long as the digest (32 bytes for HS256)
    /// - Store secrets in environment variables or secure vaults, never in code
    ///
    /// # Errors
    /// * `UnsupportedAlgorithm` - Algorithm is not HS256, HS384 or HS512
    /// * `EmptySecret` - Secret has no bytes
    pub fn hmac(secret: &[u8], algorithm: Algorithm) -> Result<Self, KeyringError> {
        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(KeyringError::UnsupportedAlgorithm(format!("{:?}", algorithm)));
        }
        if secret.is_empty() {
            return Err(KeyringError::EmptySecret);
        }

        Ok(Self {
            algorithm,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    pub(crate) fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningSecret")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

/// Key id to signing secret mapping.
///
/// New tokens are signed with the active key; any key in the ring verifies.
/// Immutable once built: rotation replaces the whole keyring.
#[derive(Debug, Clone)]
pub struct SecretKeyring {
    active_key_id: String,
    keys: HashMap<String, SigningSecret>,
}

impl SecretKeyring {
    /// Create a keyring holding a single active key.
    pub fn new(active_key_id: impl Into<String>, secret: SigningSecret) -> Self {
        let active_key_id = active_key_id.into();
        let mut keys = HashMap::new();
        keys.insert(active_key_id.clone(), secret);
        Self {
            active_key_id,
            keys,
        }
    }

    /// Create a keyring from a set of keys, one of which is active.
    ///
    /// # Errors
    /// * `MissingActiveKey` - `active_key_id` is not among `keys`
    pub fn from_keys(
        active_key_id: impl Into<String>,
        keys: impl IntoIterator<Item = (String, SigningSecret)>,
    ) -> Result<Self, KeyringError> {
        let active_key_id = active_key_id.into();
        let keys: HashMap<_, _> = keys.into_iter().collect();
        if !keys.contains_key(&active_key_id) {
            return Err(KeyringError::MissingActiveKey(active_key_id));
        }
        Ok(Self {
            active_key_id,
            keys,
        })
    }

    /// Add a verification key (retired keys kept during rotation).
    pub fn with_key(mut self, key_id: impl Into<String>, secret: SigningSecret) -> Self {
        self.keys.entry(key_id.into()).or_insert(secret);
        self
    }

    pub fn active_key_id(&self) -> &str {
        &self.active_key_id
    }

    pub(crate) fn active(&self) -> (&str, &SigningSecret) {
        // from_keys and new guarantee the active key is present
        let secret = &self.keys[&self.active_key_id];
        (&self.active_key_id, secret)
    }

    pub fn get(&self, key_id: &str) -> Option<&SigningSecret> {
        self.keys.get(key_id)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(bytes: &[u8]) -> SigningSecret {
        SigningSecret::hmac(bytes, Algorithm::HS256).unwrap()
    }

    #[test]
    fn test_rejects_non_hmac_algorithm() {
        let result = SigningSecret::hmac(b"secret", Algorithm::RS256);
        assert!(matches!(result, Err(KeyringError::UnsupportedAlgorithm(_))));
    }

    #[test]
    fn test_rejects_empty_secret() {
        let result = SigningSecret::hmac(b"", Algorithm::HS512);
        assert!(matches!(result, Err(KeyringError::EmptySecret)));
    }

    #[test]
    fn test_from_keys_requires_active_key() {
        let result = SecretKeyring::from_keys(
            "current",
            vec![("previous".to_string(), secret(b"previous-secret"))],
        );
        assert_eq!(
            result.unwrap_err(),
            KeyringError::MissingActiveKey("current".to_string())
        );
    }

    #[test]
    fn test_lookup() {
        let keyring = SecretKeyring::new("current", secret(b"current-secret"))
            .with_key("previous", secret(b"previous-secret"));

        assert_eq!(keyring.active_key_id(), "current");
        assert_eq!(keyring.active().0, "current");
        assert!(keyring.get("previous").is_some());
        assert!(keyring.get("unknown").is_none());
        assert_eq!(keyring.len(), 2);
    }

    #[test]
    fn test_with_key_does_not_replace_active() {
        let keyring = SecretKeyring::new("current", secret(b"current-secret"))
            .with_key("current", SigningSecret::hmac(b"other", Algorithm::HS512).unwrap());

        assert_eq!(keyring.active().1.algorithm(), Algorithm::HS256);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let debug = format!("{:?}", secret(b"super-secret-value"));
        assert!(!debug.contains("super-secret-value"));
    }
}
