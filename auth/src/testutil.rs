use async_trait::async_trait;
use mockall::mock;

use crate::errors::StoreError;
use crate::password::HashError;
use crate::ports::CredentialVerifier;
use crate::ports::UserStore;

mock! {
    pub Store {}

    #[async_trait]
    impl UserStore for Store {
        async fn find_stored_hash(&self, principal: &str) -> Result<Option<String>, StoreError>;
        async fn find_principal_id(&self, principal: &str) -> Result<Option<String>, StoreError>;
    }
}

mock! {
    pub Verifier {}

    impl CredentialVerifier for Verifier {
        fn verify(&self, password: &[u8], encoded: &str) -> Result<bool, HashError>;
    }
}
