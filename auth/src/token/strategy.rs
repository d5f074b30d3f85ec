use std::sync::Arc;

use jsonwebtoken::decode;
use jsonwebtoken::decode_header;
use jsonwebtoken::encode;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use parking_lot::RwLock;

use super::claims::TokenClaims;
use super::errors::TokenError;
use super::keyring::SecretKeyring;
use crate::clock::Clock;
use crate::identity::Identity;

/// Issues and validates signed bearer tokens.
///
/// Stateless: validity is proven by the signature and the keyring alone.
/// Tokens carry only a not-before time, so removing a key from the keyring is
/// the only way to revoke tokens signed with it.
pub struct TokenAuthStrategy {
    keyring: RwLock<Arc<SecretKeyring>>,
    clock: Arc<dyn Clock>,
}

impl TokenAuthStrategy {
    pub fn new(keyring: SecretKeyring, clock: Arc<dyn Clock>) -> Self {
        Self {
            keyring: RwLock::new(Arc::new(keyring)),
            clock,
        }
    }

    /// Replace the whole keyring. In-flight validations keep the keyring they
    /// started with.
    pub fn rotate(&self, keyring: SecretKeyring) {
        let active_key_id = keyring.active_key_id().to_string();
        *self.keyring.write() = Arc::new(keyring);
        tracing::info!(active_key_id = %active_key_id, "Signing keyring rotated");
    }

    fn keyring(&self) -> Arc<SecretKeyring> {
        Arc::clone(&self.keyring.read())
    }

    /// Issue a token for an authenticated identity, signed with the active key.
    ///
    /// # Errors
    /// * `SigningFailed` - Token encoding failed
    pub fn issue(&self, identity: &Identity) -> Result<String, TokenError> {
        let keyring = self.keyring();
        let (key_id, secret) = keyring.active();

        let mut header = Header::new(secret.algorithm());
        header.kid = Some(key_id.to_string());

        let claims = TokenClaims::new(identity.principal_name(), self.clock.now().timestamp())
            .with_principal_id(identity.principal_id());

        encode(&header, &claims, secret.encoding_key())
            .map_err(|e| TokenError::SigningFailed(e.to_string()))
    }

    /// Validate a presented token and recover the identity it was issued for.
    ///
    /// # Errors
    /// * `Malformed` - Token does not split into header, claims and signature
    /// * `MissingKeyId` - Header has no key id
    /// * `Invalid` - Unknown key id, bad signature or not-before in the future
    pub fn validate(&self, token: &str) -> Result<Identity, TokenError> {
        if token.split('.').count() != 3 {
            return Err(TokenError::Malformed);
        }

        let header = decode_header(token).map_err(|_| TokenError::Malformed)?;
        let key_id = header
            .kid
            .filter(|kid| !kid.is_empty())
            .ok_or(TokenError::MissingKeyId)?;

        let keyring = self.keyring();
        let secret = keyring.get(&key_id).ok_or_else(|| {
            tracing::debug!(key_id = %key_id, "Token signed with unknown key id");
            TokenError::Invalid
        })?;

        let mut validation = Validation::new(secret.algorithm());
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;

        let claims = decode::<TokenClaims>(token, secret.decoding_key(), &validation)
            .map_err(|e| {
                tracing::debug!(key_id = %key_id, error = %e, "Token verification failed");
                TokenError::Invalid
            })?
            .claims;

        if claims.is_premature(self.clock.now().timestamp()) {
            tracing::debug!(nbf = claims.nbf, "Token used before its not-before time");
            return Err(TokenError::Invalid);
        }

        Ok(Identity::new(claims.sub, claims.uid.unwrap_or_default())
            .with_extension("strategy", serde_json::json!("token"))
            .with_extension("key_id", serde_json::json!(key_id)))
    }
}
