use std::fmt;
use std::str::FromStr;

use auth::StoredCredential;
use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::user::errors::HandleError;
use crate::user::errors::RoleError;
use crate::user::errors::UserIdError;

/// User aggregate entity.
///
/// Users are never physically deleted; `active` is cleared instead so issued
/// tokens can still be traced back to an account.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub handle: Handle,
    pub password_hash: HashedSecret,
    pub role: Role,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    /// Build a freshly registered, active user.
    pub fn new(handle: Handle, password_hash: HashedSecret, role: Role, now: DateTime<Utc>) -> Self {
        Self {
            id: UserId::new(),
            handle,
            password_hash,
            role,
            active: true,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        }
    }

    /// Borrow the fields needed to check a login attempt.
    pub(crate) fn credential(&self) -> StoredCredential<'_> {
        StoredCredential {
            user_id: self.id.0,
            handle: self.handle.as_str(),
            role: self.role.as_str(),
            password_hash: self.password_hash.expose(),
        }
    }
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a user ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        Uuid::parse_str(s)
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique user-facing identifier.
///
/// An email address, trimmed and lowercased so that lookups are case
/// insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Handle(String);

impl Handle {
    const MAX_LENGTH: usize = 254;

    /// Create a new validated handle.
    ///
    /// # Errors
    /// * `Empty` - Handle is blank
    /// * `TooLong` - Handle is longer than 254 characters
    /// * `InvalidFormat` - Handle is not an RFC 5322 email address
    pub fn new(handle: String) -> Result<Self, HandleError> {
        let handle = handle.trim().to_lowercase();

        if handle.is_empty() {
            return Err(HandleError::Empty);
        }

        let length = handle.chars().count();
        if length > Self::MAX_LENGTH {
            return Err(HandleError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            });
        }

        email_address::EmailAddress::from_str(&handle)
            .map(|_| Self(handle))
            .map_err(|e| HandleError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Role or permission tag, e.g. `USER` or `ADMIN`.
///
/// Stored uppercase; 1-32 characters of ASCII letters, digits and underscore.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Role(String);

impl Role {
    const MAX_LENGTH: usize = 32;
    pub const USER: &'static str = "USER";
    pub const ADMIN: &'static str = "ADMIN";

    /// Create a new validated role tag.
    ///
    /// # Errors
    /// * `Empty` - Role is blank
    /// * `TooLong` - Role is longer than 32 characters
    /// * `InvalidCharacters` - Role contains characters other than letters, digits and underscore
    pub fn new(role: String) -> Result<Self, RoleError> {
        let role = role.trim().to_ascii_uppercase();

        if role.is_empty() {
            return Err(RoleError::Empty);
        }

        if role.len() > Self::MAX_LENGTH {
            return Err(RoleError::TooLong {
                max: Self::MAX_LENGTH,
                actual: role.len(),
            });
        }

        if !role.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(RoleError::InvalidCharacters);
        }

        Ok(Self(role))
    }

    /// The role assigned when registration does not name one.
    pub fn user() -> Self {
        Self(Self::USER.to_string())
    }

    pub fn is_admin(&self) -> bool {
        self.0 == Self::ADMIN
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Stored password hash (PHC string).
///
/// Only readable inside this crate; `Debug` never prints it.
#[derive(Clone, PartialEq, Eq)]
pub struct HashedSecret(String);

impl HashedSecret {
    pub(crate) fn new(hash: String) -> Self {
        Self(hash)
    }

    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for HashedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HashedSecret(<redacted>)")
    }
}

/// Origin of a login attempt, as reported by the transport.
///
/// Missing or blank values become `"unknown"`. Values are cut to the widths
/// of the `login_history` columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginClient {
    ip_address: String,
    device_info: String,
}

impl LoginClient {
    pub const UNKNOWN: &'static str = "unknown";
    const MAX_IP_ADDRESS_LENGTH: usize = 45;
    const MAX_DEVICE_INFO_LENGTH: usize = 512;

    pub fn new(ip_address: Option<&str>, device_info: Option<&str>) -> Self {
        Self {
            ip_address: bounded(ip_address, Self::MAX_IP_ADDRESS_LENGTH),
            device_info: bounded(device_info, Self::MAX_DEVICE_INFO_LENGTH),
        }
    }

    pub fn ip_address(&self) -> &str {
        &self.ip_address
    }

    pub fn device_info(&self) -> &str {
        &self.device_info
    }
}

impl Default for LoginClient {
    fn default() -> Self {
        Self::new(None, None)
    }
}

fn bounded(value: Option<&str>, max: usize) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| v.chars().take(max).collect())
        .unwrap_or_else(|| LoginClient::UNKNOWN.to_string())
}

/// One successful login, kept as an audit trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRecord {
    pub user_id: UserId,
    pub client: LoginClient,
    pub login_at: DateTime<Utc>,
}
