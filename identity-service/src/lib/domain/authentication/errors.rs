use thiserror::Error;

use crate::user::errors::HandleError;
use crate::user::errors::RoleError;
use crate::user::errors::UserError;

/// Errors surfaced by authentication operations.
///
/// Every failed login or token check collapses into `Unauthorized`; callers
/// cannot tell an unknown handle from a wrong password or a bad token.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Invalid handle: {0}")]
    InvalidHandle(#[from] HandleError),

    #[error("Invalid role: {0}")]
    InvalidRole(#[from] RoleError),

    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    #[error("Handle already exists: {0}")]
    DuplicateHandle(String),

    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Credential store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<UserError> for AuthError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::DuplicateHandle(handle) => AuthError::DuplicateHandle(handle),
            UserError::NotFound(id) => AuthError::NotFound(id),
            UserError::StoreUnavailable(msg) => AuthError::StoreUnavailable(msg),
            UserError::InvalidUserId(_) | UserError::InvalidHandle(_) | UserError::InvalidRole(_) => {
                AuthError::Internal(format!("Corrupt user record: {}", err))
            }
        }
    }
}
