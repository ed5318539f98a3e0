use thiserror::Error;

/// Error type for bearer token operations.
///
/// Validation failures collapse into `InvalidToken` so callers cannot tell a
/// tampered token from an expired or malformed one.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JwtError {
    #[error("Invalid key material: {0}")]
    InvalidKey(String),

    #[error("Failed to sign token: {0}")]
    Signing(String),

    #[error("Token is invalid")]
    InvalidToken,
}
