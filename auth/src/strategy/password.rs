use std::collections::HashMap;
use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::rand_core::RngCore;
use hmac::Hmac;
use hmac::Mac;
use parking_lot::Mutex;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tokio::sync::Mutex as AsyncMutex;

use super::Credentials;
use crate::cache::AuthCache;
use crate::errors::AuthError;
use crate::identity::Identity;
use crate::password::HashError;
use crate::ports::CredentialVerifier;
use crate::ports::UserStore;

type HmacSha256 = Hmac<Sha256>;

const DIGEST_KEY_LENGTH: usize = 32;

/// One async lock per principal whose cache miss is being resolved.
type FlightLocks = Mutex<HashMap<String, Arc<AsyncMutex<()>>>>;

/// Cache value for a principal that recently passed password verification.
///
/// Holds a keyed digest of the password that was accepted, so a cache hit
/// still rejects a different password without rerunning the slow hash.
#[derive(Clone)]
pub struct CachedCredential {
    identity: Identity,
    digest: Vec<u8>,
}

/// Authenticates a principal name and password against the user store.
///
/// The slow hash runs at most once per cache TTL for a given principal and
/// password, regardless of request volume.
pub struct PasswordAuthStrategy<S, V>
where
    S: UserStore,
    V: CredentialVerifier,
{
    store: Arc<S>,
    verifier: Arc<V>,
    cache: Arc<AuthCache<CachedCredential>>,
    digest_key: [u8; DIGEST_KEY_LENGTH],
    decoy_hash: Option<String>,
    in_flight: FlightLocks,
}

impl<S, V> PasswordAuthStrategy<S, V>
where
    S: UserStore,
    V: CredentialVerifier,
{
    /// Create a new password strategy with injected dependencies.
    ///
    /// # Arguments
    /// * `store` - Source of stored hashes and principal IDs
    /// * `verifier` - Checks passwords against stored hashes
    /// * `cache` - Recently authenticated principals
    ///
    /// # Errors
    /// * `RandomSource` - The cache digest key could not be generated
    pub fn new(
        store: Arc<S>,
        verifier: Arc<V>,
        cache: Arc<AuthCache<CachedCredential>>,
    ) -> Result<Self, HashError> {
        let mut digest_key = [0u8; DIGEST_KEY_LENGTH];
        OsRng
            .try_fill_bytes(&mut digest_key)
            .map_err(|e| HashError::RandomSource(e.to_string()))?;

        Ok(Self {
            store,
            verifier,
            cache,
            digest_key,
            decoy_hash: None,
            in_flight: Mutex::new(HashMap::new()),
        })
    }

    /// Verify against `hash` when the principal is unknown, so that unknown
    /// principals cost the same time as wrong passwords.
    pub fn with_decoy_hash(mut self, hash: String) -> Self {
        self.decoy_hash = Some(hash);
        self
    }

    /// Authenticate basic credentials.
    ///
    /// # Errors
    /// * `MissingCredentials` - No principal name or password was presented
    /// * `InvalidCredentials` - Unknown principal or wrong password
    /// * `StoredHash` - The principal's stored hash cannot be decoded
    /// * `Store` - User store lookup failed
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<Identity, AuthError> {
        let (principal, password) = match credentials {
            Credentials::Basic {
                principal,
                password,
            } if !principal.is_empty() && !password.is_empty() => (principal, password),
            _ => return Err(AuthError::MissingCredentials),
        };

        let digest = self.digest(password)?;

        if let Some(outcome) = self.check_cache(principal, &digest) {
            return outcome;
        }

        // Concurrent misses for one principal queue here so the slow hash
        // runs once; later callers are answered from the cache.
        let slot = FlightSlot::acquire(&self.in_flight, principal);
        let _permit = slot.lock.lock().await;

        if let Some(outcome) = self.check_cache(principal, &digest) {
            return outcome;
        }

        let Some(stored_hash) = self.store.find_stored_hash(principal).await? else {
            tracing::debug!(principal = %principal, "Unknown principal");
            self.verify_decoy(password).await;
            return Err(AuthError::InvalidCredentials);
        };

        let matched = match self.verify(password, stored_hash).await? {
            Ok(matched) => matched,
            Err(e) => {
                tracing::error!(principal = %principal, error = %e, "Stored password hash is unusable");
                // Undecodable hashes fail fast; pay for a full hash anyway
                self.verify_decoy(password).await;
                return Err(AuthError::StoredHash(e));
            }
        };

        if !matched {
            tracing::debug!(principal = %principal, "Wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let principal_id = self
            .store
            .find_principal_id(principal)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let identity = Identity::new(principal.as_str(), principal_id)
            .with_extension("strategy", serde_json::json!("password"));
        self.cache.put(
            principal.as_str(),
            CachedCredential {
                identity: identity.clone(),
                digest,
            },
        );

        Ok(identity)
    }

    /// Answer from the cache when the principal has a live entry.
    fn check_cache(&self, principal: &str, digest: &[u8]) -> Option<Result<Identity, AuthError>> {
        let cached = self.cache.get(principal)?;

        if bool::from(cached.digest.as_slice().ct_eq(digest)) {
            tracing::debug!(principal = %principal, "Authenticated from cache");
            return Some(Ok(cached.identity));
        }

        // Rejected without the slow hash: a cached principal answers a wrong
        // password faster than an uncached one.
        tracing::debug!(principal = %principal, "Password does not match cached credential");
        Some(Err(AuthError::InvalidCredentials))
    }

    async fn verify_decoy(&self, password: &str) {
        if let Some(decoy) = &self.decoy_hash {
            let _ = self.verify(password, decoy.clone()).await;
        }
    }

    /// Run the slow hash off the async executor.
    async fn verify(
        &self,
        password: &str,
        encoded: String,
    ) -> Result<Result<bool, HashError>, AuthError> {
        let verifier = Arc::clone(&self.verifier);
        let password = password.to_string();

        tokio::task::spawn_blocking(move || verifier.verify(password.as_bytes(), &encoded))
            .await
            .map_err(|e| AuthError::Internal(format!("Password verification task failed: {}", e)))
    }

    fn digest(&self, password: &str) -> Result<Vec<u8>, AuthError> {
        let mut mac = HmacSha256::new_from_slice(&self.digest_key)
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        mac.update(password.as_bytes());
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

/// Membership in the per-principal lock map. The map entry is dropped once
/// no caller holds it.
struct FlightSlot<'a> {
    locks: &'a FlightLocks,
    principal: &'a str,
    lock: Arc<AsyncMutex<()>>,
}

impl<'a> FlightSlot<'a> {
    fn acquire(locks: &'a FlightLocks, principal: &'a str) -> Self {
        let lock = Arc::clone(
            locks
                .lock()
                .entry(principal.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(()))),
        );
        Self {
            locks,
            principal,
            lock,
        }
    }
}

impl Drop for FlightSlot<'_> {
    fn drop(&mut self) {
        let mut locks = self.locks.lock();
        let owned_by_map = locks
            .get(self.principal)
            .map_or(false, |lock| Arc::ptr_eq(lock, &self.lock));
        // map entry plus this slot
        if owned_by_map && Arc::strong_count(&self.lock) == 2 {
            locks.remove(self.principal);
        }
    }
}
