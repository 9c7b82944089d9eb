use thiserror::Error;

/// Error for UserId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for Handle validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HandleError {
    #[error("Handle must not be empty")]
    Empty,

    #[error("Handle too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },

    #[error("Handle must be a valid email address: {0}")]
    InvalidFormat(String),
}

/// Error for Role validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RoleError {
    #[error("Role must not be empty")]
    Empty,

    #[error("Role too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },

    #[error("Role contains invalid characters (only letters, digits and underscore allowed)")]
    InvalidCharacters,
}

/// Credential store errors
#[derive(Debug, Clone, Error)]
pub enum UserError {
    // Value object validation errors (stored rows that no longer validate)
    #[error("Invalid user ID: {0}")]
    InvalidUserId(#[from] UserIdError),

    #[error("Invalid handle: {0}")]
    InvalidHandle(#[from] HandleError),

    #[error("Invalid role: {0}")]
    InvalidRole(#[from] RoleError),

    // Domain-level errors
    #[error("Handle already exists: {0}")]
    DuplicateHandle(String),

    #[error("User not found: {0}")]
    NotFound(String),

    // Infrastructure errors
    #[error("Credential store unavailable: {0}")]
    StoreUnavailable(String),
}
