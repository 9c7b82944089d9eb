use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::user::models::Handle;
use crate::domain::user::models::HashedSecret;
use crate::domain::user::models::LoginClient;
use crate::domain::user::models::LoginRecord;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;

/// Persistence operations for user aggregate (the credential store).
///
/// Implementations must be safe to call concurrently. `create` is an atomic
/// create-if-absent on the handle.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist new user to storage.
    ///
    /// # Errors
    /// * `DuplicateHandle` - Handle is already registered
    /// * `StoreUnavailable` - Storage operation failed
    async fn create(&self, user: User) -> Result<User, UserError>;

    /// Retrieve user by identifier.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `StoreUnavailable` - Storage operation failed
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;

    /// Retrieve user by handle.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `StoreUnavailable` - Storage operation failed
    async fn find_by_handle(&self, handle: &Handle) -> Result<Option<User>, UserError>;

    /// Replace a user's password hash.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `StoreUnavailable` - Storage operation failed
    async fn update_password(
        &self,
        id: &UserId,
        password_hash: &HashedSecret,
        at: DateTime<Utc>,
    ) -> Result<(), UserError>;

    /// Record a successful login: stamp `last_login_at` and append a
    /// login history entry, as one unit.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `StoreUnavailable` - Storage operation failed
    async fn record_login(
        &self,
        id: &UserId,
        client: &LoginClient,
        at: DateTime<Utc>,
    ) -> Result<(), UserError>;

    /// Most recent logins of a user, newest first.
    ///
    /// # Errors
    /// * `StoreUnavailable` - Storage operation failed
    async fn login_history(&self, id: &UserId, limit: usize) -> Result<Vec<LoginRecord>, UserError>;

    /// Soft-deactivate a user. Deactivating an inactive user is a no-op.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `StoreUnavailable` - Storage operation failed
    async fn deactivate(&self, id: &UserId, at: DateTime<Utc>) -> Result<(), UserError>;
}
