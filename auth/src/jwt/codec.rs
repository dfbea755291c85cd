use std::fmt;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::errors::JwtError;

/// Minimum secret length for HS256 (256 bits).
pub const MIN_SECRET_LEN: usize = 32;

/// A freshly signed token together with the claims it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

impl IssuedToken {
    /// Expiration of the token.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.claims.expires_at()
    }
}

/// Token codec for issuing and parsing signed access tokens.
///
/// Tokens are compact JWS values signed with HS256 (HMAC with SHA-256).
/// The codec holds no mutable state and the caller supplies the clock,
/// so one instance can be shared freely between requests.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl TokenCodec {
    /// Create a new codec from a shared secret and a token lifetime.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens, at least 32 bytes
    /// * `lifetime` - Time between issuance and expiry
    ///
    /// # Errors
    /// * `InvalidConfiguration` - Secret is too short, or lifetime is not positive
    ///   or cannot be added to the current time
    pub fn new(secret: &[u8], lifetime: Duration) -> Result<Self, JwtError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(JwtError::InvalidConfiguration(format!(
                "signing secret must be at least {} bytes, got {}",
                MIN_SECRET_LEN,
                secret.len()
            )));
        }

        if lifetime <= Duration::zero() {
            return Err(JwtError::InvalidConfiguration(
                "token lifetime must be positive".to_string(),
            ));
        }

        if Utc::now().checked_add_signed(lifetime).is_none() {
            return Err(JwtError::InvalidConfiguration(format!(
                "token lifetime of {} ms is out of range",
                lifetime.num_milliseconds()
            )));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is judged against the caller's clock in `is_expired`
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            lifetime,
        })
    }

    /// Configured token lifetime.
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Issue a signed token for a subject.
    ///
    /// # Arguments
    /// * `subject` - Username the token asserts
    /// * `role` - Role claim
    /// * `now` - Issuance instant
    ///
    /// # Errors
    /// * `EncodingFailed` - Expiry is out of range or token signing failed
    pub fn issue(
        &self,
        subject: &str,
        role: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, JwtError> {
        let claims = Claims::new(subject, role, now, self.lifetime).ok_or_else(|| {
            JwtError::EncodingFailed(format!("expiry of token issued at {} is out of range", now))
        })?;
        let header = Header::new(Algorithm::HS256);

        let token = encode(&header, &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))?;

        Ok(IssuedToken { token, claims })
    }

    /// Verify the signature of a token and decode its claims.
    ///
    /// Claims are only deserialized once the signature has been checked
    /// against the shared secret. Expiry is not checked here.
    ///
    /// # Errors
    /// * `InvalidSignature` - Signature does not match or algorithm is not HS256
    /// * `Malformed` - Token structure, encoding or claims are invalid
    pub fn parse(&self, token: &str) -> Result<Claims, JwtError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    JwtError::InvalidSignature
                }
                _ => JwtError::Malformed(e.to_string()),
            })
    }

    /// Check whether claims are expired at `now`.
    pub fn is_expired(&self, claims: &Claims, now: DateTime<Utc>) -> bool {
        claims.is_expired(now)
    }

    /// Parse a token and reject it if it is expired at `now`.
    ///
    /// # Errors
    /// * `InvalidSignature` / `Malformed` - See [`TokenCodec::parse`]
    /// * `Expired` - Token expiry is not in the future
    pub fn authorize(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, JwtError> {
        let claims = self.parse(token)?;

        if self.is_expired(&claims, now) {
            return Err(JwtError::Expired);
        }

        Ok(claims)
    }

    /// True iff the token parses, is unexpired and names exactly `expected_subject`.
    pub fn validate(&self, token: &str, expected_subject: &str, now: DateTime<Utc>) -> bool {
        self.authorize(token, now)
            .map(|claims| claims.sub == expected_subject)
            .unwrap_or(false)
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &Algorithm::HS256)
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}
