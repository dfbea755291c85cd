use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::user::models::AuthenticateCommand;
use crate::domain::user::models::LoginIdentifier;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::StoredCredentials;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for registration and login.
///
/// Concrete implementation of UserServicePort with dependency injection.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<auth::Authenticator>,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - Credential store implementation
    /// * `authenticator` - Password hashing and verification
    pub fn new(repository: Arc<UR>, authenticator: Arc<auth::Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
        }
    }

    async fn find_credentials(
        &self,
        identifier: &LoginIdentifier,
    ) -> Result<Option<StoredCredentials>, UserError> {
        match identifier {
            LoginIdentifier::Email(email) => self.repository.find_by_email(email).await,
            LoginIdentifier::Username(raw) => match Username::new(raw.clone()) {
                Ok(username) => self.repository.find_by_username(&username).await,
                // Could never have been registered
                Err(_) => Ok(None),
            },
        }
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn register_user(&self, command: RegisterUserCommand) -> Result<User, UserError> {
        if self
            .repository
            .exists_by_username(&command.username)
            .await?
        {
            return Err(UserError::UsernameAlreadyExists(
                command.username.as_str().to_string(),
            ));
        }

        if self
            .repository
            .exists_by_email(command.email.as_str())
            .await?
        {
            return Err(UserError::EmailAlreadyExists(
                command.email.as_str().to_string(),
            ));
        }

        let password_hash = self
            .authenticator
            .hash_password(command.password.expose())?;

        let user = self
            .repository
            .create(NewUser {
                username: command.username,
                email: command.email,
                password_hash,
                role: command.role,
            })
            .await?;

        tracing::info!(user_id = %user.id, username = %user.username, role = %user.role, "User registered");

        Ok(user)
    }

    async fn authenticate(&self, command: AuthenticateCommand) -> Result<User, UserError> {
        let Some(credentials) = self.find_credentials(&command.identifier).await? else {
            self.authenticator
                .verify_dummy_password(command.password.expose())?;
            tracing::debug!("Login rejected: unknown identifier");
            return Err(UserError::InvalidCredentials);
        };

        if !credentials.is_enabled() {
            return Err(UserError::InvalidCredentials);
        }

        match self
            .authenticator
            .verify_password(command.password.expose(), credentials.password_hash())
        {
            Ok(()) => Ok(credentials.into_user()),
            Err(auth::AuthenticationError::InvalidCredentials) => {
                tracing::debug!(user_id = %credentials.user.id, "Login rejected: password mismatch");
                Err(UserError::InvalidCredentials)
            }
            Err(e) => Err(UserError::Hashing(e.to_string())),
        }
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .map(StoredCredentials::into_user)
            .ok_or(UserError::NotFound(id.to_string()))
    }

    async fn get_user_by_username(&self, username: &Username) -> Result<User, UserError> {
        self.repository
            .find_by_username(username)
            .await?
            .map(StoredCredentials::into_user)
            .ok_or(UserError::NotFoundByUsername(username.to_string()))
    }
}
