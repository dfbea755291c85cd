use std::sync::OnceLock;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as Argon2PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Algorithm;
use argon2::Argon2;
use argon2::Params;
use argon2::Version;

use super::errors::PasswordError;

/// Plaintext hashed by `verify_dummy` so a missing account costs one full verification.
const DUMMY_PASSWORD: &str = "dummy-password-for-timing-equalization";

/// Argon2id cost parameters.
///
/// Higher memory and iteration counts make every hash and verification slower,
/// for attackers and for the login endpoint alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHashingParams {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes over memory
    pub iterations: u32,
    /// Degree of parallelism (lanes)
    pub parallelism: u32,
}

impl Default for PasswordHashingParams {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// Password hashing implementation.
///
/// Provides cryptographic password hashing (internally uses Argon2id).
/// Verification delegates to the argon2 crate, which compares digests in constant time.
#[derive(Clone)]
pub struct PasswordHasher {
    params: Params,
    dummy_hash: OnceLock<String>,
}

impl PasswordHasher {
    /// Create a new password hasher instance.
    ///
    /// # Returns
    /// PasswordHasher instance configured with the argon2 crate defaults
    pub fn new() -> Self {
        Self {
            params: Params::default(),
            dummy_hash: OnceLock::new(),
        }
    }

    /// Create a password hasher with explicit cost parameters.
    ///
    /// # Arguments
    /// * `params` - Memory, iteration and parallelism costs
    ///
    /// # Errors
    /// * `InvalidParams` - Parameters are outside the ranges Argon2 accepts
    pub fn with_params(params: PasswordHashingParams) -> Result<Self, PasswordError> {
        let params = Params::new(
            params.memory_kib,
            params.iterations,
            params.parallelism,
            None,
        )
        .map_err(|e| PasswordError::InvalidParams(e.to_string()))?;

        Ok(Self {
            params,
            dummy_hash: OnceLock::new(),
        })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a plaintext password securely.
    ///
    /// Uses Argon2id with random salt generation.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to hash
    ///
    /// # Returns
    /// PHC string format hash (includes algorithm, parameters, salt, and hash)
    ///
    /// # Errors
    /// * `HashingFailed` - Password hashing operation failed
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Verify a password against a stored hash.
    ///
    /// The cost parameters are read from the PHC string, so hashes produced
    /// under older settings keep verifying after the configuration changes.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `hash` - Stored password hash in PHC string format
    ///
    /// # Returns
    /// True if password matches, false otherwise
    ///
    /// # Errors
    /// * `VerificationFailed` - Hash format is invalid
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed_hash = PasswordHash::new(hash).map_err(|e| {
            PasswordError::VerificationFailed(format!("Invalid password hash: {}", e))
        })?;

        Ok(self
            .argon2()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash checked by `verify_dummy`, built on first use.
    ///
    /// A failed attempt is not cached, so the next call retries.
    ///
    /// # Errors
    /// * `HashingFailed` - Password hashing operation failed
    pub(crate) fn dummy_hash(&self) -> Result<&str, PasswordError> {
        if let Some(hash) = self.dummy_hash.get() {
            return Ok(hash);
        }

        let hash = self.hash(DUMMY_PASSWORD)?;
        Ok(self.dummy_hash.get_or_init(|| hash))
    }

    /// Run a verification whose outcome is discarded.
    ///
    /// Called when no account matches a login identifier so that the response
    /// time does not reveal whether the account exists.
    ///
    /// # Errors
    /// * `HashingFailed` - The dummy hash could not be built
    pub fn verify_dummy(&self, password: &str) -> Result<(), PasswordError> {
        let dummy_hash = self.dummy_hash()?;

        let _ = self.verify(password, dummy_hash);
        Ok(())
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
