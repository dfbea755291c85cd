use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use sqlx::Row;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::StoredCredentials;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

const USERNAME_CONSTRAINT: &str = "app_users_username_key";
const EMAIL_CONSTRAINT: &str = "app_users_email_key";

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn credentials_from_row(row: PgRow) -> Result<StoredCredentials, UserError> {
        let database_error = |e: sqlx::Error| UserError::DatabaseError(e.to_string());

        credentials_from_columns(
            row.try_get("id").map_err(database_error)?,
            row.try_get("username").map_err(database_error)?,
            row.try_get("email").map_err(database_error)?,
            row.try_get("password_hash").map_err(database_error)?,
            row.try_get("role").map_err(database_error)?,
        )
    }

    async fn find_one(
        &self,
        column: &'static str,
        bind: QueryValue<'_>,
    ) -> Result<Option<StoredCredentials>, UserError> {
        let statement = format!(
            "SELECT id, username, email, password_hash, role FROM app_users WHERE {} = $1",
            column
        );
        let query = sqlx::query(&statement);
        let query = match bind {
            QueryValue::Id(id) => query.bind(id),
            QueryValue::Text(text) => query.bind(text),
        };

        query
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?
            .map(Self::credentials_from_row)
            .transpose()
    }

    async fn exists(&self, column: &'static str, value: &str) -> Result<bool, UserError> {
        let statement = format!(
            "SELECT EXISTS (SELECT 1 FROM app_users WHERE {} = $1)",
            column
        );

        sqlx::query_scalar::<_, bool>(&statement)
            .bind(value)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))
    }
}

/// Rebuild an account from stored columns.
///
/// Values that fail validation are a storage fault, never a client error.
fn credentials_from_columns(
    id: i64,
    username: String,
    email: String,
    password_hash: String,
    role: String,
) -> Result<StoredCredentials, UserError> {
    let corrupt = |column: &str, e: &dyn std::fmt::Display| {
        UserError::DatabaseError(format!("Stored {} of user {} is invalid: {}", column, id, e))
    };

    Ok(StoredCredentials {
        user: User {
            id: UserId(id),
            username: Username::new(username).map_err(|e| corrupt("username", &e))?,
            email: EmailAddress::new(email).map_err(|e| corrupt("email", &e))?,
            role: role.parse().map_err(|e| corrupt("role", &e))?,
        },
        password_hash,
    })
}

enum QueryValue<'a> {
    Id(i64),
    Text(&'a str),
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, UserError> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO app_users (username, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(user.username.as_str())
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    if db_err.constraint() == Some(USERNAME_CONSTRAINT) {
                        return UserError::UsernameAlreadyExists(
                            user.username.as_str().to_string(),
                        );
                    }
                    if db_err.constraint() == Some(EMAIL_CONSTRAINT) {
                        return UserError::EmailAlreadyExists(user.email.as_str().to_string());
                    }
                }
            }
            UserError::DatabaseError(e.to_string())
        })?;

        Ok(User {
            id: UserId(id),
            username: user.username,
            email: user.email,
            role: user.role,
        })
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<StoredCredentials>, UserError> {
        self.find_one("id", QueryValue::Id(id.0)).await
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<StoredCredentials>, UserError> {
        self.find_one("username", QueryValue::Text(username.as_str()))
            .await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<StoredCredentials>, UserError> {
        self.find_one("email", QueryValue::Text(email)).await
    }

    async fn exists_by_username(&self, username: &Username) -> Result<bool, UserError> {
        self.exists("username", username.as_str()).await
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, UserError> {
        self.exists("email", email).await
    }
}
