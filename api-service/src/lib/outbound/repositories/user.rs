use std::collections::hash_map::Entry;
use std::collections::HashMap;

use async_trait::async_trait;
use auth::StoreError;
use auth::UserStore;
use parking_lot::RwLock;

use crate::domain::user::models::User;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

/// Process-local user storage keyed by username.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        match self.users.write().entry(user.username.as_str().to_string()) {
            Entry::Occupied(_) => Err(UserError::UsernameAlreadyExists(
                user.username.as_str().to_string(),
            )),
            Entry::Vacant(slot) => {
                slot.insert(user.clone());
                tracing::debug!(user_id = %user.id, "User stored");
                Ok(user)
            }
        }
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError> {
        Ok(self.users.read().get(username.as_str()).cloned())
    }
}

#[async_trait]
impl UserStore for InMemoryUserRepository {
    async fn find_stored_hash(&self, principal: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .users
            .read()
            .get(principal)
            .map(|user| user.password_hash.clone()))
    }

    async fn find_principal_id(&self, principal: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .users
            .read()
            .get(principal)
            .map(|user| user.id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::user::models::UserId;

    fn user(name: &str) -> User {
        User {
            id: UserId::new(),
            username: Username::new(name.to_string()).unwrap(),
            password_hash: format!("hash-of-{}", name),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repository = InMemoryUserRepository::new();
        let created = repository.create(user("alice")).await.unwrap();

        let found = repository
            .find_by_username(&created.username)
            .await
            .unwrap()
            .expect("User should exist");
        assert_eq!(found.id, created.id);
        assert_eq!(repository.len(), 1);
    }

    #[tokio::test]
    async fn test_create_duplicate() {
        let repository = InMemoryUserRepository::new();
        repository.create(user("alice")).await.unwrap();

        let result = repository.create(user("alice")).await;
        assert!(matches!(result, Err(UserError::UsernameAlreadyExists(_))));
        assert_eq!(repository.len(), 1);
    }

    #[tokio::test]
    async fn test_user_store_lookups() {
        let repository = InMemoryUserRepository::new();
        let created = repository.create(user("alice")).await.unwrap();

        assert_eq!(
            repository.find_stored_hash("alice").await.unwrap().as_deref(),
            Some("hash-of-alice")
        );
        assert_eq!(
            repository.find_principal_id("alice").await.unwrap(),
            Some(created.id.to_string())
        );
        assert!(repository.find_stored_hash("bob").await.unwrap().is_none());
        assert!(repository.find_principal_id("bob").await.unwrap().is_none());
    }
}
