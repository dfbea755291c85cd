use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use crate::domain::user::models::AuthenticateCommand;
use crate::domain::user::models::LoginIdentifier;
use crate::domain::user::models::Password;
use crate::domain::user::models::Role;
use crate::domain::user::models::User;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::router::AppState;

/// Responds with the bare token fields, outside the `data` envelope.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponseData>, ApiError> {
    let user = state
        .user_service
        .authenticate(body.try_into_command()?)
        .await
        .map_err(ApiError::from)?;

    let issued = state
        .authenticator
        .issue_token(user.username.as_str(), user.role.as_str(), Utc::now())
        .map_err(ApiError::internal)?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(LoginResponseData::new(
        issued.token,
        &user,
        state.authenticator.token_lifetime().num_milliseconds(),
    )))
}

/// HTTP request body for a login attempt (raw JSON)
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "usernameOrEmail")]
    identifier: String,
    password: String,
}

impl LoginRequest {
    fn try_into_command(self) -> Result<AuthenticateCommand, ApiError> {
        let identifier = self.identifier.trim();
        if identifier.is_empty() {
            return Err(ApiError::UnprocessableEntity(
                "Username or email is required".to_string(),
            ));
        }

        let password = Password::new(self.password)
            .map_err(|e| ApiError::UnprocessableEntity(e.to_string()))?;

        Ok(AuthenticateCommand {
            identifier: LoginIdentifier::classify(identifier.to_string()),
            password,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponseData {
    pub token: String,
    pub token_type: &'static str,
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
    /// Token lifetime in milliseconds
    pub expires_in: i64,
}

impl LoginResponseData {
    fn new(token: String, user: &User, expires_in: i64) -> Self {
        Self {
            token,
            token_type: "Bearer",
            user_id: user.id.0,
            username: user.username.as_str().to_string(),
            email: user.email.as_str().to_string(),
            role: user.role,
            expires_in,
        }
    }
}
