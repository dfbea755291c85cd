//! Runs against the database named by `DATABASE_URL`; skipped when it is unset.

use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use chrono::Utc;
use quiz_service::domain::user::models::EmailAddress;
use quiz_service::domain::user::models::NewUser;
use quiz_service::domain::user::models::Role;
use quiz_service::domain::user::models::Username;
use quiz_service::domain::user::ports::UserRepository;
use quiz_service::outbound::repositories::PostgresUserRepository;
use quiz_service::user::errors::UserError;
use sqlx::postgres::PgPoolOptions;

static SEQUENCE: AtomicUsize = AtomicUsize::new(0);

async fn repository() -> Option<PostgresUserRepository> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping Postgres repository test");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("Failed to connect to Postgres");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    Some(PostgresUserRepository::new(pool))
}

/// Username unique across test runs sharing one database
fn unique_name(prefix: &str) -> String {
    format!(
        "{}_{}_{}",
        prefix,
        Utc::now().timestamp_micros(),
        SEQUENCE.fetch_add(1, Ordering::Relaxed)
    )
}

fn new_user(username: &str, email: &str) -> NewUser {
    NewUser {
        username: Username::new(username.to_string()).unwrap(),
        email: EmailAddress::new(email.to_string()).unwrap(),
        password_hash: "$argon2id$v=19$m=1024,t=1,p=1$c2FsdA$aGFzaA".to_string(),
        role: Role::Player,
    }
}

#[tokio::test]
async fn test_create_and_find() {
    let Some(repository) = repository().await else {
        return;
    };
    let name = unique_name("alice");
    let email = format!("{}@x.com", name);

    let created = repository.create(new_user(&name, &email)).await.unwrap();

    let username = Username::new(name.clone()).unwrap();
    let by_username = repository.find_by_username(&username).await.unwrap().unwrap();
    let by_email = repository.find_by_email(&email).await.unwrap().unwrap();
    let by_id = repository.find_by_id(&created.id).await.unwrap().unwrap();

    assert_eq!(by_username.user, created);
    assert_eq!(by_email.user, created);
    assert_eq!(by_id.user, created);
    assert_eq!(by_id.user.role, Role::Player);
    assert!(by_id.password_hash().starts_with("$argon2id$"));
    assert!(repository.exists_by_username(&username).await.unwrap());
    assert!(repository.exists_by_email(&email).await.unwrap());
}

#[tokio::test]
async fn test_unique_constraints_map_to_conflicts() {
    let Some(repository) = repository().await else {
        return;
    };
    let name = unique_name("bob");
    let email = format!("{}@x.com", name);
    repository.create(new_user(&name, &email)).await.unwrap();

    let other_name = unique_name("carol");
    let same_name = repository
        .create(new_user(&name, &format!("{}@x.com", other_name)))
        .await;
    let same_email = repository.create(new_user(&other_name, &email)).await;

    assert!(matches!(same_name, Err(UserError::UsernameAlreadyExists(ref n)) if *n == name));
    assert!(matches!(same_email, Err(UserError::EmailAlreadyExists(ref e)) if *e == email));
    assert!(!repository
        .exists_by_username(&Username::new(other_name).unwrap())
        .await
        .unwrap());
}

#[tokio::test]
async fn test_concurrent_registrations_create_one_record() {
    let Some(repository) = repository().await else {
        return;
    };
    let repository = Arc::new(repository);
    let name = unique_name("dave");

    let attempts: Vec<_> = (0..8)
        .map(|i| {
            let repository = Arc::clone(&repository);
            let user = new_user(&name, &format!("{}_{}@x.com", name, i));
            tokio::spawn(async move { repository.create(user).await })
        })
        .collect();

    let mut created = 0;
    for attempt in attempts {
        match attempt.await.unwrap() {
            Ok(_) => created += 1,
            Err(UserError::UsernameAlreadyExists(_)) => {}
            Err(e) => panic!("Unexpected error: {}", e),
        }
    }

    assert_eq!(created, 1);
}
