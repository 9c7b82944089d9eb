use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::user::models::Handle;
use crate::domain::user::models::HashedSecret;
use crate::domain::user::models::LoginClient;
use crate::domain::user::models::LoginRecord;
use crate::domain::user::models::Role;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

const HANDLE_UNIQUE_CONSTRAINT: &str = "users_handle_key";

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    handle: String,
    password_hash: String,
    role: String,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    last_login_at: Option<DateTime<Utc>>,
}

impl TryFrom<UserRow> for User {
    type Error = UserError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId(row.id),
            handle: Handle::new(row.handle)?,
            password_hash: HashedSecret::new(row.password_hash),
            role: Role::new(row.role)?,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
            last_login_at: row.last_login_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct LoginRecordRow {
    user_id: Uuid,
    ip_address: String,
    device_info: String,
    login_at: DateTime<Utc>,
}

impl From<LoginRecordRow> for LoginRecord {
    fn from(row: LoginRecordRow) -> Self {
        LoginRecord {
            user_id: UserId(row.user_id),
            client: LoginClient::new(Some(&row.ip_address), Some(&row.device_info)),
            login_at: row.login_at,
        }
    }
}

fn store_error(e: sqlx::Error) -> UserError {
    UserError::StoreUnavailable(e.to_string())
}

fn ensure_affected(rows_affected: u64, id: &UserId) -> Result<(), UserError> {
    if rows_affected == 0 {
        return Err(UserError::NotFound(id.to_string()));
    }
    Ok(())
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, handle, password_hash, role, active, created_at, updated_at, last_login_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(user.id.0)
        .bind(user.handle.as_str())
        .bind(user.password_hash.expose())
        .bind(user.role.as_str())
        .bind(user.active)
        .bind(user.created_at)
        .bind(user.updated_at)
        .bind(user.last_login_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation()
                    && db_err.constraint() == Some(HANDLE_UNIQUE_CONSTRAINT)
                {
                    return UserError::DuplicateHandle(user.handle.as_str().to_string());
                }
            }
            store_error(e)
        })?;

        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, handle, password_hash, role, active, created_at, updated_at, last_login_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_handle(&self, handle: &Handle) -> Result<Option<User>, UserError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, handle, password_hash, role, active, created_at, updated_at, last_login_at
            FROM users
            WHERE handle = $1
            "#,
        )
        .bind(handle.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        row.map(User::try_from).transpose()
    }

    async fn update_password(
        &self,
        id: &UserId,
        password_hash: &HashedSecret,
        at: DateTime<Utc>,
    ) -> Result<(), UserError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .bind(password_hash.expose())
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(store_error)?;

        ensure_affected(result.rows_affected(), id)
    }

    async fn record_login(
        &self,
        id: &UserId,
        client: &LoginClient,
        at: DateTime<Utc>,
    ) -> Result<(), UserError> {
        let mut transaction = self.pool.begin().await.map_err(store_error)?;

        let result = sqlx::query(
            r#"
            UPDATE users
            SET last_login_at = $2
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .bind(at)
        .execute(&mut *transaction)
        .await
        .map_err(store_error)?;

        ensure_affected(result.rows_affected(), id)?;

        sqlx::query(
            r#"
            INSERT INTO login_history (user_id, ip_address, device_info, login_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(id.0)
        .bind(client.ip_address())
        .bind(client.device_info())
        .bind(at)
        .execute(&mut *transaction)
        .await
        .map_err(store_error)?;

        transaction.commit().await.map_err(store_error)
    }

    async fn login_history(&self, id: &UserId, limit: usize) -> Result<Vec<LoginRecord>, UserError> {
        let rows = sqlx::query_as::<_, LoginRecordRow>(
            r#"
            SELECT user_id, ip_address, device_info, login_at
            FROM login_history
            WHERE user_id = $1
            ORDER BY login_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(id.0)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(rows.into_iter().map(LoginRecord::from).collect())
    }

    async fn deactivate(&self, id: &UserId, at: DateTime<Utc>) -> Result<(), UserError> {
        // Already inactive rows keep their original updated_at
        let result = sqlx::query(
            r#"
            UPDATE users
            SET active = FALSE,
                updated_at = CASE WHEN active THEN $2 ELSE updated_at END
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(store_error)?;

        ensure_affected(result.rows_affected(), id)
    }
}
