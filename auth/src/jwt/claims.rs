use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Access token payload.
///
/// `sub` carries the user's handle; `uid` and `role` are private claims.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user handle)
    pub sub: String,

    /// User identifier
    pub uid: Uuid,

    /// Role tag
    pub role: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique token identifier)
    pub jti: String,

    /// Issuer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

impl Claims {
    /// Check if the token is expired at `current_timestamp`.
    ///
    /// A token is no longer valid at the exact second of its expiry.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp <= current_timestamp
    }
}

/// Identity resolved from a verified token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub user_id: Uuid,
    pub handle: String,
    pub role: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
