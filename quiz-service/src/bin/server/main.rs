use std::sync::Arc;

use auth::Authenticator;
use quiz_service::config::Config;
use quiz_service::config::DatabaseConfig;
use quiz_service::domain::user::ports::UserServicePort;
use quiz_service::domain::user::service::UserService;
use quiz_service::inbound::http::router::create_router;
use quiz_service::outbound::repositories::InMemoryUserRepository;
use quiz_service::outbound::repositories::PostgresUserRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quiz_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "quiz-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        token_lifetime_ms = config.jwt.expiration_ms,
        verify_subject_exists = config.auth.verify_subject_exists,
        "Configuration loaded"
    );

    let authenticator = Arc::new(Authenticator::new(config.auth_settings()).map_err(|e| {
        tracing::error!(error = %e, "Invalid signing configuration");
        e
    })?);

    let user_service = build_user_service(&config.database, Arc::clone(&authenticator)).await?;

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(
        user_service,
        authenticator,
        config.auth.verify_subject_exists,
    );

    if let Err(e) = axum::serve(http_listener, http_application).await {
        tracing::error!(error = %e, "Server error");
        return Err(e.into());
    }

    tracing::info!("Server exited successfully");
    Ok(())
}

async fn build_user_service(
    database: &DatabaseConfig,
    authenticator: Arc<Authenticator>,
) -> Result<Arc<dyn UserServicePort>, anyhow::Error> {
    let Some(url) = database.url.as_deref() else {
        tracing::warn!(database = "in-memory", "No database configured, accounts are not persisted");
        let repository = Arc::new(InMemoryUserRepository::new());
        return Ok(Arc::new(UserService::new(repository, authenticator)));
    };

    let pg_pool = PgPoolOptions::new()
        .max_connections(database.max_connections)
        .connect(url)
        .await?;
    tracing::info!(
        max_connections = database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let repository = Arc::new(PostgresUserRepository::new(pg_pool));
    Ok(Arc::new(UserService::new(repository, authenticator)))
}
