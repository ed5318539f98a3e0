use thiserror::Error;

/// Error for Category validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CategoryError {
    #[error("Category too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Error for TodoText validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TodoTextError {
    #[error("Todo text must not be empty")]
    Empty,

    #[error("Todo text too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Top-level error for todo operations
#[derive(Debug, Clone, Error)]
pub enum TodoError {
    #[error("Invalid category: {0}")]
    InvalidCategory(#[from] CategoryError),

    #[error("Invalid todo text: {0}")]
    InvalidText(#[from] TodoTextError),

    #[error("Unknown todo status code: {0}")]
    InvalidStatus(i16),

    #[error("Invalid time range: {start} > {end}")]
    InvalidRange { start: i64, end: i64 },

    #[error("Todo not found: {0}")]
    NotFound(String),

    #[error("Todo {0} belongs to another user")]
    PermissionDenied(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
