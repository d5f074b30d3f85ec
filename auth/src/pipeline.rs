use std::collections::HashMap;

use crate::errors::AuthError;
use crate::identity::Identity;
use crate::ports::CredentialVerifier;
use crate::ports::UserStore;
use crate::strategy::AuthStrategy;
use crate::strategy::Credentials;

/// How an endpoint expects callers to authenticate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointPolicy {
    /// Principal name and password
    Password,
    /// Bearer token issued by the token strategy
    Token,
}

/// Routes each request to the strategy bound to its endpoint policy.
///
/// Strategies are bound once at startup and shared read-only afterwards.
pub struct AuthPipeline<S, V>
where
    S: UserStore,
    V: CredentialVerifier,
{
    strategies: HashMap<EndpointPolicy, AuthStrategy<S, V>>,
}

impl<S, V> AuthPipeline<S, V>
where
    S: UserStore,
    V: CredentialVerifier,
{
    pub fn new() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }

    /// Bind a strategy to a policy, replacing any earlier binding.
    pub fn with_strategy(mut self, policy: EndpointPolicy, strategy: AuthStrategy<S, V>) -> Self {
        self.strategies.insert(policy, strategy);
        self
    }

    /// Authenticate credentials under an endpoint policy.
    ///
    /// # Errors
    /// * `Internal` - No strategy is bound to `policy`
    /// * Any error of the bound strategy
    pub async fn authenticate(
        &self,
        policy: EndpointPolicy,
        credentials: &Credentials,
    ) -> Result<Identity, AuthError> {
        let strategy = self.strategies.get(&policy).ok_or_else(|| {
            AuthError::Internal(format!("No strategy bound to {:?} policy", policy))
        })?;

        strategy.authenticate(credentials).await
    }

    /// Authenticate and require the principal to own the requested resource.
    ///
    /// # Errors
    /// * `NotResourceOwner` - Authenticated principal is not `owner`
    /// * Any error of [`authenticate`](Self::authenticate)
    pub async fn authenticate_owner(
        &self,
        policy: EndpointPolicy,
        credentials: &Credentials,
        owner: &str,
    ) -> Result<Identity, AuthError> {
        let identity = self.authenticate(policy, credentials).await?;
        authorize_owner(&identity, owner)?;
        Ok(identity)
    }
}

impl<S, V> Default for AuthPipeline<S, V>
where
    S: UserStore,
    V: CredentialVerifier,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Require `identity` to be the owner of a resource.
pub fn authorize_owner(identity: &Identity, owner: &str) -> Result<(), AuthError> {
    if identity.principal_name() == owner {
        Ok(())
    } else {
        tracing::debug!(
            principal = %identity.principal_name(),
            owner = %owner,
            "Principal does not own requested resource"
        );
        Err(AuthError::NotResourceOwner)
    }
}
