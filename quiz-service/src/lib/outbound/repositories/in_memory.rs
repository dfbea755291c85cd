use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::user::models::NewUser;
use crate::domain::user::models::StoredCredentials;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

/// Credential store kept in process memory.
///
/// Uniqueness checks and the insert happen under one write lock, which gives
/// the same guarantee as the unique constraints of the Postgres schema.
#[derive(Default)]
pub struct InMemoryUserRepository {
    state: RwLock<State>,
}

#[derive(Default)]
struct State {
    last_id: i64,
    users: BTreeMap<UserId, StoredCredentials>,
}

impl State {
    fn find(&self, predicate: impl Fn(&StoredCredentials) -> bool) -> Option<StoredCredentials> {
        self.users.values().find(|c| predicate(c)).cloned()
    }
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.users.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, UserError> {
        let mut state = self.state.write().await;

        if state
            .find(|c| c.user.username == user.username)
            .is_some()
        {
            return Err(UserError::UsernameAlreadyExists(
                user.username.as_str().to_string(),
            ));
        }
        if state.find(|c| c.user.email == user.email).is_some() {
            return Err(UserError::EmailAlreadyExists(
                user.email.as_str().to_string(),
            ));
        }

        state.last_id += 1;
        let stored = User {
            id: UserId(state.last_id),
            username: user.username,
            email: user.email,
            role: user.role,
        };
        state.users.insert(
            stored.id,
            StoredCredentials {
                user: stored.clone(),
                password_hash: user.password_hash,
            },
        );

        Ok(stored)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<StoredCredentials>, UserError> {
        Ok(self.state.read().await.users.get(id).cloned())
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<StoredCredentials>, UserError> {
        Ok(self
            .state
            .read()
            .await
            .find(|c| &c.user.username == username))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<StoredCredentials>, UserError> {
        Ok(self
            .state
            .read()
            .await
            .find(|c| c.user.email.as_str() == email))
    }

    async fn exists_by_username(&self, username: &Username) -> Result<bool, UserError> {
        Ok(self.find_by_username(username).await?.is_some())
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, UserError> {
        Ok(self.find_by_email(email).await?.is_some())
    }
}
