use thiserror::Error;

/// Error type for credential operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Malformed credential: expected {expected} bytes, got {actual}")]
    MalformedCredential { expected: usize, actual: usize },

    #[error("Invalid hashing parameters: {0}")]
    InvalidParameters(String),
}
