use async_trait::async_trait;
use auth::Identity;
use auth::IssuedToken;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::authentication::errors::AuthError;
use crate::domain::authentication::models::ChangePasswordCommand;
use crate::domain::authentication::models::LoginCommand;
use crate::domain::authentication::models::RegisterCommand;
use crate::domain::user::models::LoginRecord;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;

/// Port for authentication operations.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Register a new user.
    ///
    /// # Errors
    /// * `InvalidPassword` - Password violates the length policy
    /// * `DuplicateHandle` - Handle is already registered
    /// * `StoreUnavailable` - Credential store failed
    async fn register(&self, command: RegisterCommand, now: DateTime<Utc>) -> Result<User, AuthError>;

    /// Verify credentials and issue an access token.
    ///
    /// # Errors
    /// * `Unauthorized` - Unknown handle, wrong password or inactive user
    /// * `StoreUnavailable` - Credential store failed
    async fn login(&self, command: LoginCommand, now: DateTime<Utc>) -> Result<IssuedToken, AuthError>;

    /// Resolve the identity behind a bearer token.
    ///
    /// # Errors
    /// * `Unauthorized` - Token is expired, tampered with or malformed
    fn authorize(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, AuthError>;

    /// Change the password of an authenticated user.
    ///
    /// # Errors
    /// * `Unauthorized` - User is gone or inactive, or current password is wrong
    /// * `InvalidPassword` - New password violates the length policy
    /// * `StoreUnavailable` - Credential store failed
    async fn change_password(
        &self,
        user_id: &UserId,
        command: ChangePasswordCommand,
        now: DateTime<Utc>,
    ) -> Result<(), AuthError>;

    /// Most recent logins of a user, newest first. `limit` is clamped to
    /// `1..=100`.
    ///
    /// # Errors
    /// * `StoreUnavailable` - Credential store failed
    async fn login_history(&self, user_id: &UserId, limit: usize) -> Result<Vec<LoginRecord>, AuthError>;

    /// Soft-deactivate a user.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `StoreUnavailable` - Credential store failed
    async fn deactivate(&self, user_id: &UserId, now: DateTime<Utc>) -> Result<(), AuthError>;
}
