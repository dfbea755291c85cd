use thiserror::Error;

/// Error type for token operations.
///
/// The variants stay distinct for diagnostics. Callers at a trust boundary
/// are expected to collapse every validation failure into one outcome.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JwtError {
    #[error("Invalid token configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token is malformed: {0}")]
    Malformed(String),

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token is expired")]
    Expired,
}
