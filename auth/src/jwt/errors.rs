use thiserror::Error;

/// Error type for token operations.
///
/// `Expired`, `BadSignature` and `Malformed` are the verification outcomes.
/// The remaining variants come from key setup and issuance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Token is expired")]
    Expired,

    #[error("Token signature does not match")]
    BadSignature,

    #[error("Token is malformed: {0}")]
    Malformed(String),

    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Signing key too short: minimum {min} bytes, got {actual}")]
    KeyTooShort { min: usize, actual: usize },

    #[error("Token lifetime out of range: {0} seconds")]
    InvalidTtl(i64),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::InvalidSignature => TokenError::BadSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed(err.to_string()),
        }
    }
}
