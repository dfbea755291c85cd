use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::jwt::Claims;
use crate::jwt::IssuedToken;
use crate::jwt::JwtError;
use crate::jwt::TokenCodec;
use crate::password::PasswordError;
use crate::password::PasswordHasher;
use crate::password::PasswordHashingParams;

/// Default token lifetime: 24 hours.
pub const DEFAULT_TOKEN_LIFETIME_MS: i64 = 86_400_000;

/// Process-wide settings consumed by the [`Authenticator`].
#[derive(Clone)]
pub struct AuthSettings {
    /// Shared HMAC secret
    pub secret: Vec<u8>,
    /// Token lifetime
    pub token_lifetime: Duration,
    /// Password hashing cost
    pub password: PasswordHashingParams,
}

impl AuthSettings {
    /// Settings with the default lifetime and hashing cost.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
            token_lifetime: Duration::milliseconds(DEFAULT_TOKEN_LIFETIME_MS),
            password: PasswordHashingParams::default(),
        }
    }

    pub fn with_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.token_lifetime = lifetime;
        self
    }

    pub fn with_password_params(mut self, params: PasswordHashingParams) -> Self {
        self.password = params;
        self
    }
}

/// Authentication coordinator combining password verification and token handling.
///
/// Built once at startup and shared; every operation is a pure function of
/// its inputs and the configured secret.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_codec: TokenCodec,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `settings` - Secret, token lifetime and hashing cost
    ///
    /// # Errors
    /// * `JwtError` - Secret or lifetime is unusable
    /// * `PasswordError` - Hashing parameters are invalid
    pub fn new(settings: AuthSettings) -> Result<Self, AuthenticationError> {
        let token_codec = TokenCodec::new(&settings.secret, settings.token_lifetime)?;
        let password_hasher = PasswordHasher::with_params(settings.password)?;
        // Unusable hashing fails construction, not the first unknown-account login
        password_hasher.dummy_hash()?;

        Ok(Self {
            password_hasher,
            token_codec,
        })
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Check a password against a stored hash.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Stored hash could not be parsed
    pub fn verify_password(
        &self,
        password: &str,
        stored_hash: &str,
    ) -> Result<(), AuthenticationError> {
        if self.password_hasher.verify(password, stored_hash)? {
            Ok(())
        } else {
            Err(AuthenticationError::InvalidCredentials)
        }
    }

    /// Spend the cost of one verification without a stored hash.
    ///
    /// # Errors
    /// * `PasswordError` - The dummy hash could not be built
    pub fn verify_dummy_password(&self, password: &str) -> Result<(), PasswordError> {
        self.password_hasher.verify_dummy(password)
    }

    /// Issue a token for a subject and role at `now`.
    pub fn issue_token(
        &self,
        subject: &str,
        role: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, JwtError> {
        self.token_codec.issue(subject, role, now)
    }

    /// Verify a token's signature and expiry at `now`.
    pub fn authorize_token(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, JwtError> {
        self.token_codec.authorize(token, now)
    }

    /// True iff the token is valid at `now` and names `expected_subject`.
    pub fn validate_token(&self, token: &str, expected_subject: &str, now: DateTime<Utc>) -> bool {
        self.token_codec.validate(token, expected_subject, now)
    }

    pub fn token_lifetime(&self) -> Duration {
        self.token_codec.lifetime()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authenticator() -> Authenticator {
        let settings = AuthSettings::new(b"test_secret_key_at_least_32_bytes!".to_vec())
            .with_password_params(PasswordHashingParams {
                memory_kib: 1024,
                iterations: 1,
                parallelism: 1,
            });
        Authenticator::new(settings).expect("Failed to build authenticator")
    }

    #[test]
    fn test_verify_password_success() {
        let authenticator = authenticator();

        let hash = authenticator
            .hash_password("my_password")
            .expect("Failed to hash password");

        assert!(authenticator.verify_password("my_password", &hash).is_ok());
    }

    #[test]
    fn test_verify_password_invalid() {
        let authenticator = authenticator();
        let hash = authenticator.hash_password("my_password").unwrap();

        let result = authenticator.verify_password("wrong_password", &hash);
        assert!(matches!(
            result,
            Err(AuthenticationError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_verify_password_corrupt_hash() {
        let result = authenticator().verify_password("my_password", "not-a-phc-string");
        assert!(matches!(
            result,
            Err(AuthenticationError::PasswordError(_))
        ));
    }

    #[test]
    fn test_verify_dummy_password() {
        let authenticator = authenticator();

        assert!(authenticator.verify_dummy_password("anything").is_ok());
    }

    #[test]
    fn test_issue_and_authorize_token() {
        let authenticator = authenticator();
        let now = Utc::now();

        let issued = authenticator
            .issue_token("user123", "PLAYER", now)
            .expect("Failed to issue token");

        let claims = authenticator
            .authorize_token(&issued.token, now)
            .expect("Token validation failed");
        assert_eq!(claims.sub, "user123");
        assert_eq!(claims.role, "PLAYER");
        assert!(authenticator.validate_token(&issued.token, "user123", now));
    }

    #[test]
    fn test_authorize_expired_token() {
        let authenticator = authenticator();
        let now = Utc::now();
        let issued = authenticator.issue_token("user123", "PLAYER", now).unwrap();

        let later = now + authenticator.token_lifetime() + Duration::seconds(1);
        assert_eq!(
            authenticator.authorize_token(&issued.token, later),
            Err(JwtError::Expired)
        );
    }

    #[test]
    fn test_default_lifetime_is_one_day() {
        assert_eq!(authenticator().token_lifetime(), Duration::hours(24));
    }

    #[test]
    fn test_weak_secret_fails_construction() {
        let result = Authenticator::new(AuthSettings::new(b"short".to_vec()));
        assert!(matches!(result, Err(AuthenticationError::JwtError(_))));
    }
}
