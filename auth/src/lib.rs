//! Authentication utilities library
//!
//! Provides the credential and token primitives used by the quiz service:
//! - Password hashing (Argon2id) with tunable cost
//! - Signed, time-bounded access tokens (HS256 JWT)
//! - Authentication coordination
//!
//! Nothing here performs I/O or reads ambient configuration. The secret, the
//! token lifetime and the current time are always passed in by the caller.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Tokens
//! ```
//! use auth::TokenCodec;
//! use chrono::{Duration, Utc};
//!
//! let codec = TokenCodec::new(b"secret_key_at_least_32_bytes_long!", Duration::hours(24)).unwrap();
//! let now = Utc::now();
//! let issued = codec.issue("alice", "PLAYER", now).unwrap();
//! assert!(codec.validate(&issued.token, "alice", now));
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::{AuthSettings, Authenticator};
//! use chrono::Utc;
//!
//! let auth = Authenticator::new(AuthSettings::new(b"secret_key_at_least_32_bytes_long!".to_vec())).unwrap();
//!
//! // Register: hash password
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Login: verify and issue token
//! auth.verify_password("password123", &hash).unwrap();
//! let issued = auth.issue_token("alice", "PLAYER", Utc::now()).unwrap();
//!
//! // Later request: authorize token
//! let claims = auth.authorize_token(&issued.token, Utc::now()).unwrap();
//! assert_eq!(claims.sub, "alice");
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthSettings;
pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use authenticator::DEFAULT_TOKEN_LIFETIME_MS;
pub use jwt::Claims;
pub use jwt::IssuedToken;
pub use jwt::JwtError;
pub use jwt::TokenCodec;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use password::PasswordHashingParams;
