use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;

use super::handlers::ApiError;
use crate::domain::user::models::Role;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

/// Paths reachable without a token. Entries ending in `/*` match the prefix
/// and everything below it.
pub const PUBLIC_ROUTES: &[&str] = &[
    "/api/auth/register",
    "/api/auth/login",
    "/health",
    "/v3/api-docs/*",
    "/swagger-ui/*",
];

/// Principal established from a verified token, stored in request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub username: String,
    pub role: Role,
}

pub fn is_public(path: &str) -> bool {
    PUBLIC_ROUTES.iter().any(|route| match route.strip_suffix("/*") {
        Some(prefix) => {
            path == prefix
                || path
                    .strip_prefix(prefix)
                    .is_some_and(|rest| rest.starts_with('/'))
        }
        None => path == *route,
    })
}

/// Middleware guarding every route outside [`PUBLIC_ROUTES`].
///
/// Any missing, malformed, forged or expired token produces the same
/// `401 Authentication required` response.
pub async fn authorize(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if is_public(req.uri().path()) {
        return Ok(next.run(req).await);
    }

    let token = extract_bearer_token(&req).ok_or_else(|| {
        tracing::debug!(path = %req.uri().path(), "Request without bearer token");
        ApiError::authentication_required()
    })?;

    let claims = state
        .authenticator
        .authorize_token(token, Utc::now())
        .map_err(|e| {
            tracing::warn!(error = %e, "Token rejected");
            ApiError::authentication_required()
        })?;

    let role: Role = claims.role.parse().map_err(|e| {
        tracing::warn!(error = %e, "Token carries unknown role");
        ApiError::authentication_required()
    })?;

    if state.verify_subject_exists {
        ensure_subject_exists(&state, &claims.sub).await?;
    }

    req.extensions_mut().insert(AuthenticatedUser {
        username: claims.sub,
        role,
    });

    Ok(next.run(req).await)
}

async fn ensure_subject_exists(state: &AppState, subject: &str) -> Result<(), ApiError> {
    let username = Username::new(subject.to_string()).map_err(|e| {
        tracing::warn!(error = %e, "Token subject is not a valid username");
        ApiError::authentication_required()
    })?;

    match state.user_service.get_user_by_username(&username).await {
        Ok(_) => Ok(()),
        Err(UserError::NotFoundByUsername(_)) => {
            tracing::warn!(username = %username, "Token subject no longer exists");
            Err(ApiError::authentication_required())
        }
        Err(e) => Err(e.into()),
    }
}

/// Token from `Authorization: Bearer <token>`; the scheme is case-insensitive.
fn extract_bearer_token(req: &Request) -> Option<&str> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    if !scheme.eq_ignore_ascii_case("Bearer") || token.is_empty() {
        return None;
    }

    Some(token)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http;
    use axum::http::StatusCode;
    use axum::Router;
    use chrono::Duration;
    use tower::ServiceExt;

    use super::*;
    use crate::domain::user::models::EmailAddress;
    use crate::domain::user::models::Password;
    use crate::domain::user::models::RegisterUserCommand;
    use crate::domain::user::service::UserService;
    use crate::inbound::http::router::create_router;
    use crate::outbound::repositories::InMemoryUserRepository;

    fn authenticator() -> Arc<auth::Authenticator> {
        let settings =
            auth::AuthSettings::new(b"test-secret-key-for-jwt-signing-at-least-32-bytes".to_vec())
                .with_password_params(auth::PasswordHashingParams {
                    memory_kib: 1024,
                    iterations: 1,
                    parallelism: 1,
                });
        Arc::new(auth::Authenticator::new(settings).unwrap())
    }

    async fn app(verify_subject_exists: bool) -> (Router, Arc<auth::Authenticator>) {
        let authenticator = authenticator();
        let service = UserService::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::clone(&authenticator),
        );
        service
            .register_user(RegisterUserCommand::new(
                Username::new("alice".to_string()).unwrap(),
                EmailAddress::new("a@x.com".to_string()).unwrap(),
                Password::for_registration("secret1".to_string()).unwrap(),
                Role::Player,
            ))
            .await
            .unwrap();

        let router = create_router(
            Arc::new(service),
            Arc::clone(&authenticator),
            verify_subject_exists,
        );
        (router, authenticator)
    }

    fn token_for(authenticator: &auth::Authenticator, subject: &str) -> String {
        authenticator
            .issue_token(subject, "PLAYER", Utc::now())
            .unwrap()
            .token
    }

    fn get(uri: &str, authorization: Option<&str>) -> Request {
        let mut builder = http::Request::builder().uri(uri);
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_public_routes() {
        assert!(is_public("/api/auth/login"));
        assert!(is_public("/api/auth/register"));
        assert!(is_public("/health"));
        assert!(is_public("/swagger-ui"));
        assert!(is_public("/swagger-ui/index.html"));
        assert!(is_public("/v3/api-docs/quiz"));

        assert!(!is_public("/api/auth/login/extra"));
        assert!(!is_public("/swagger-uix"));
        assert!(!is_public("/api/users/me"));
        assert!(!is_public("/"));
    }

    #[tokio::test]
    async fn test_public_route_needs_no_token() {
        let (router, _) = app(false).await;

        let response = router.oneshot(get("/health", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler() {
        let (router, authenticator) = app(false).await;
        let token = token_for(&authenticator, "alice");

        let response = router
            .oneshot(get("/api/users/me", Some(&format!("bearer {}", token))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["data"]["username"], "alice");
    }

    #[tokio::test]
    async fn test_rejections_are_uniform() {
        let (router, authenticator) = app(false).await;
        let token = token_for(&authenticator, "alice");
        let truncated = format!("Bearer {}", &token[..token.len() - 1]);
        let expired = authenticator
            .issue_token("alice", "PLAYER", Utc::now() - Duration::days(2))
            .unwrap()
            .token;
        let expired = format!("Bearer {}", expired);
        let basic = format!("Basic {}", token);

        let headers = [
            None,
            Some(""),
            Some("Bearer"),
            Some("Bearer   "),
            Some(basic.as_str()),
            Some("Bearer not.a.jwt"),
            Some(truncated.as_str()),
            Some(expired.as_str()),
        ];

        for authorization in headers {
            let response = router
                .clone()
                .oneshot(get("/api/users/me", authorization))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(
                response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
                "Bearer"
            );
            let body = body_json(response).await;
            assert_eq!(body["data"]["message"], "Authentication required");
        }
    }

    #[tokio::test]
    async fn test_unknown_path_is_gated() {
        let (router, _) = app(false).await;

        let response = router.oneshot(get("/api/quizzes", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_subject_lookup_is_optional() {
        let (relaxed, authenticator) = app(false).await;
        let ghost = format!("Bearer {}", token_for(&authenticator, "ghost"));

        // Passes the gate, then the handler finds no such user
        let response = relaxed
            .oneshot(get("/api/users/me", Some(&ghost)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let (strict, authenticator) = app(true).await;
        let ghost = format!("Bearer {}", token_for(&authenticator, "ghost"));
        let alice = format!("Bearer {}", token_for(&authenticator, "alice"));

        let response = strict
            .clone()
            .oneshot(get("/api/users/me", Some(&ghost)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = strict
            .oneshot(get("/api/users/me", Some(&alice)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_players_only_read_themselves() {
        let (router, authenticator) = app(false).await;
        let alice = format!("Bearer {}", token_for(&authenticator, "alice"));
        let admin = format!(
            "Bearer {}",
            authenticator
                .issue_token("root", "ADMIN", Utc::now())
                .unwrap()
                .token
        );

        let own = router
            .clone()
            .oneshot(get("/api/users/1", Some(&alice)))
            .await
            .unwrap();
        let other = router
            .clone()
            .oneshot(get("/api/users/2", Some(&alice)))
            .await
            .unwrap();
        let as_admin = router
            .oneshot(get("/api/users/1", Some(&admin)))
            .await
            .unwrap();

        assert_eq!(own.status(), StatusCode::OK);
        assert_eq!(other.status(), StatusCode::FORBIDDEN);
        assert_eq!(as_admin.status(), StatusCode::OK);
    }
}
