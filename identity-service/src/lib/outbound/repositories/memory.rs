use std::collections::HashMap;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::user::models::Handle;
use crate::domain::user::models::HashedSecret;
use crate::domain::user::models::LoginClient;
use crate::domain::user::models::LoginRecord;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

/// Process-local credential store.
///
/// Used by tests and for running the service without a database. Both maps
/// sit behind one lock so the handle check and the insert happen atomically.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    state: RwLock<State>,
}

#[derive(Debug, Default)]
struct State {
    users: HashMap<UserId, User>,
    /// Map of handle -> user id
    handles: HashMap<Handle, UserId>,
    /// Append-only login history
    logins: Vec<LoginRecord>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users, active or not.
    pub async fn len(&self) -> usize {
        self.state.read().await.users.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn modify<F>(&self, id: &UserId, change: F) -> Result<(), UserError>
    where
        F: FnOnce(&mut User) + Send,
    {
        let mut state = self.state.write().await;
        let user = state
            .users
            .get_mut(id)
            .ok_or_else(|| UserError::NotFound(id.to_string()))?;
        change(user);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        let mut state = self.state.write().await;

        if state.handles.contains_key(&user.handle) {
            return Err(UserError::DuplicateHandle(user.handle.as_str().to_string()));
        }

        state.handles.insert(user.handle.clone(), user.id);
        state.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        Ok(self.state.read().await.users.get(id).cloned())
    }

    async fn find_by_handle(&self, handle: &Handle) -> Result<Option<User>, UserError> {
        let state = self.state.read().await;

        Ok(state
            .handles
            .get(handle)
            .and_then(|id| state.users.get(id))
            .cloned())
    }

    async fn update_password(
        &self,
        id: &UserId,
        password_hash: &HashedSecret,
        at: DateTime<Utc>,
    ) -> Result<(), UserError> {
        let password_hash = password_hash.clone();
        self.modify(id, move |user| {
            user.password_hash = password_hash;
            user.updated_at = at;
        })
        .await
    }

    async fn record_login(
        &self,
        id: &UserId,
        client: &LoginClient,
        at: DateTime<Utc>,
    ) -> Result<(), UserError> {
        let mut state = self.state.write().await;
        let user = state
            .users
            .get_mut(id)
            .ok_or_else(|| UserError::NotFound(id.to_string()))?;
        user.last_login_at = Some(at);

        state.logins.push(LoginRecord {
            user_id: *id,
            client: client.clone(),
            login_at: at,
        });

        Ok(())
    }

    async fn login_history(&self, id: &UserId, limit: usize) -> Result<Vec<LoginRecord>, UserError> {
        let state = self.state.read().await;

        let mut records: Vec<LoginRecord> = state
            .logins
            .iter()
            .rev()
            .filter(|record| record.user_id == *id)
            .cloned()
            .collect();
        // Stable, so equal timestamps stay in reverse insertion order
        records.sort_by(|a, b| b.login_at.cmp(&a.login_at));
        records.truncate(limit);

        Ok(records)
    }

    async fn deactivate(&self, id: &UserId, at: DateTime<Utc>) -> Result<(), UserError> {
        self.modify(id, move |user| {
            if user.active {
                user.active = false;
                user.updated_at = at;
            }
        })
        .await
    }
}
