use thiserror::Error;

use crate::user::status::Transition;
use crate::user::status::UserStatus;

/// Error for LoginName validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoginNameError {
    #[error("Login name too long: maximum {max} bytes, got {actual}")]
    TooLong { max: usize, actual: usize },

    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for password policy violations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordPolicyError {
    #[error("Password must not be empty")]
    Empty,

    #[error("Password too long: maximum {max} bytes, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Error for ActivationKey parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ActivationKeyError {
    #[error("Invalid activation key format: {0}")]
    InvalidFormat(String),
}

/// Error for stored codes that map to no known variant
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodeError {
    #[error("Unknown user status code: {0}")]
    UnknownStatus(i16),

    #[error("Unknown account type code: {0}")]
    UnknownAccountType(i16),
}

/// Error for outbound mail delivery
#[derive(Debug, Clone, Error)]
pub enum MailError {
    #[error("Invalid mailbox: {0}")]
    InvalidAddress(String),

    #[error("Failed to build message: {0}")]
    BuildFailed(String),

    #[error("Failed to deliver message: {0}")]
    DeliveryFailed(String),
}

/// Top-level error for all user-related operations
#[derive(Debug, Clone, Error)]
pub enum UserError {
    #[error("Invalid login name: {0}")]
    InvalidLoginName(#[from] LoginNameError),

    #[error("Invalid password: {0}")]
    InvalidPassword(#[from] PasswordPolicyError),

    #[error("Invalid stored record: {0}")]
    InvalidRecord(#[from] CodeError),

    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Login name already exists: {0}")]
    LoginNameAlreadyExists(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account not yet activated")]
    NotActivated,

    #[error("Account is blocked")]
    Blocked,

    #[error("Cannot {transition} a user in status {from}")]
    InvalidTransition {
        from: UserStatus,
        transition: Transition,
    },

    #[error("Credential error: {0}")]
    Credential(String),

    #[error("Token issuance failed: {0}")]
    TokenIssue(String),

    #[error("Mail error: {0}")]
    Mail(#[from] MailError),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
