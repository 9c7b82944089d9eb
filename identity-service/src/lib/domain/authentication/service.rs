use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use auth::Identity;
use auth::IssuedToken;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::authentication::errors::AuthError;
use crate::domain::authentication::models::ChangePasswordCommand;
use crate::domain::authentication::models::LoginCommand;
use crate::domain::authentication::models::RegisterCommand;
use crate::domain::authentication::ports::AuthServicePort;
use crate::domain::user::models::Handle;
use crate::domain::user::models::HashedSecret;
use crate::domain::user::models::LoginRecord;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::ports::UserRepository;

/// Upper bound on accepted passwords, keeps hashing cost bounded.
const MAX_PASSWORD_LENGTH: usize = 1024;

const MAX_LOGIN_HISTORY: usize = 100;

/// Domain service implementation for authentication operations.
///
/// Collaborators are passed in through the constructor. Argon2 work runs on
/// the blocking thread pool.
pub struct AuthService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
    min_password_length: usize,
}

impl<UR> AuthService<UR>
where
    UR: UserRepository,
{
    /// Create a new auth service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - Credential store implementation
    /// * `authenticator` - Password and token coordinator
    /// * `min_password_length` - Shortest accepted password, in characters
    pub fn new(
        repository: Arc<UR>,
        authenticator: Arc<Authenticator>,
        min_password_length: usize,
    ) -> Self {
        Self {
            repository,
            authenticator,
            min_password_length,
        }
    }

    fn check_password_policy(&self, password: &str) -> Result<(), AuthError> {
        let length = password.chars().count();

        if length < self.min_password_length {
            return Err(AuthError::InvalidPassword(format!(
                "Password must be at least {} characters",
                self.min_password_length
            )));
        }

        if length > MAX_PASSWORD_LENGTH {
            return Err(AuthError::InvalidPassword(format!(
                "Password must be at most {} characters",
                MAX_PASSWORD_LENGTH
            )));
        }

        Ok(())
    }

    async fn hash_password(&self, password: String) -> Result<HashedSecret, AuthError> {
        let authenticator = Arc::clone(&self.authenticator);

        run_blocking(move || authenticator.hash_password(&password))
            .await?
            .map(HashedSecret::new)
            .map_err(|e| AuthError::Internal(format!("Password hashing failed: {}", e)))
    }
}

async fn run_blocking<T, F>(task: F) -> Result<T, AuthError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| AuthError::Internal(format!("Blocking task failed: {}", e)))
}

#[async_trait]
impl<UR> AuthServicePort for AuthService<UR>
where
    UR: UserRepository,
{
    async fn register(&self, command: RegisterCommand, now: DateTime<Utc>) -> Result<User, AuthError> {
        self.check_password_policy(&command.password)?;

        let password_hash = self.hash_password(command.password).await?;
        let user = User::new(command.handle, password_hash, command.role, now);

        let created_user = self.repository.create(user).await?;

        tracing::info!(
            user_id = %created_user.id,
            role = %created_user.role,
            "User registered"
        );

        Ok(created_user)
    }

    async fn login(&self, command: LoginCommand, now: DateTime<Utc>) -> Result<IssuedToken, AuthError> {
        let LoginCommand {
            handle,
            password,
            client,
        } = command;

        let user = match Handle::new(handle) {
            Ok(handle) => self.repository.find_by_handle(&handle).await?,
            Err(_) => None,
        };
        let user = user.filter(|user| user.active);

        let authenticator = Arc::clone(&self.authenticator);
        let candidate = user.clone();
        let outcome = run_blocking(move || {
            authenticator.authenticate(&password, candidate.as_ref().map(User::credential), now)
        })
        .await?;

        let issued = match outcome {
            Ok(issued) => issued,
            Err(AuthenticationError::InvalidCredentials) => {
                tracing::info!("Login rejected");
                return Err(AuthError::Unauthorized);
            }
            Err(AuthenticationError::PasswordError(e)) => {
                tracing::error!(error = %e, "Stored password hash could not be checked");
                return Err(AuthError::Internal(e.to_string()));
            }
            Err(AuthenticationError::TokenError(e)) => {
                tracing::error!(error = %e, "Token issuance failed");
                return Err(AuthError::Internal(e.to_string()));
            }
        };

        if let Some(user) = &user {
            if let Err(e) = self.repository.record_login(&user.id, &client, now).await {
                tracing::warn!(user_id = %user.id, error = %e, "Failed to record login");
            }
            tracing::info!(
                user_id = %user.id,
                ip_address = %client.ip_address(),
                expires_at = %issued.expires_at,
                "Token issued"
            );
        }

        Ok(issued)
    }

    fn authorize(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, AuthError> {
        self.authenticator.validate_token(token, now).map_err(|e| {
            tracing::debug!(reason = %e, "Token rejected");
            AuthError::Unauthorized
        })
    }

    async fn change_password(
        &self,
        user_id: &UserId,
        command: ChangePasswordCommand,
        now: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        let user = self
            .repository
            .find_by_id(user_id)
            .await?
            .filter(|user| user.active)
            .ok_or(AuthError::Unauthorized)?;

        self.check_password_policy(&command.new_password)?;

        let authenticator = Arc::clone(&self.authenticator);
        let stored_hash = user.password_hash.clone();
        let current_password = command.current_password;
        let matches = run_blocking(move || {
            authenticator.verify_password(&current_password, stored_hash.expose())
        })
        .await?
        .map_err(|e| AuthError::Internal(e.to_string()))?;

        if !matches {
            tracing::info!(user_id = %user.id, "Password change rejected");
            return Err(AuthError::Unauthorized);
        }

        let new_hash = self.hash_password(command.new_password).await?;
        self.repository
            .update_password(&user.id, &new_hash, now)
            .await?;

        tracing::info!(user_id = %user.id, "Password changed");

        Ok(())
    }

    async fn login_history(&self, user_id: &UserId, limit: usize) -> Result<Vec<LoginRecord>, AuthError> {
        let limit = limit.clamp(1, MAX_LOGIN_HISTORY);

        Ok(self.repository.login_history(user_id, limit).await?)
    }

    async fn deactivate(&self, user_id: &UserId, now: DateTime<Utc>) -> Result<(), AuthError> {
        self.repository.deactivate(user_id, now).await?;

        tracing::info!(user_id = %user_id, "User deactivated");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use auth::HashingCost;
    use auth::PasswordHasher;
    use auth::SigningKey;
    use auth::TokenIssuer;
    use auth::TokenVerifier;
    use chrono::Duration;
    use chrono::TimeZone;
    use mockall::mock;

    use super::*;
    use crate::domain::user::models::LoginClient;
    use crate::domain::user::models::Role;
    use crate::user::errors::UserError;

    mock! {
        pub TestUserRepository {}

        #[async_trait]
        impl UserRepository for TestUserRepository {
            async fn create(&self, user: User) -> Result<User, UserError>;
            async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;
            async fn find_by_handle(&self, handle: &Handle) -> Result<Option<User>, UserError>;
            async fn update_password(&self, id: &UserId, password_hash: &HashedSecret, at: DateTime<Utc>) -> Result<(), UserError>;
            async fn record_login(&self, id: &UserId, client: &LoginClient, at: DateTime<Utc>) -> Result<(), UserError>;
            async fn login_history(&self, id: &UserId, limit: usize) -> Result<Vec<LoginRecord>, UserError>;
            async fn deactivate(&self, id: &UserId, at: DateTime<Utc>) -> Result<(), UserError>;
        }
    }

    const TTL: i64 = 3600;

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn authenticator() -> Arc<Authenticator> {
        let key = SigningKey::new(b"test-secret-key-for-jwt-signing-at-least-32-bytes").unwrap();
        let hasher = PasswordHasher::with_cost(HashingCost {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap();

        Arc::new(
            Authenticator::new(
                hasher,
                TokenIssuer::new(key.clone(), TTL).unwrap(),
                TokenVerifier::new(key),
            )
            .unwrap(),
        )
    }

    fn service(
        repository: MockTestUserRepository,
        authenticator: Arc<Authenticator>,
    ) -> AuthService<MockTestUserRepository> {
        AuthService::new(Arc::new(repository), authenticator, 6)
    }

    fn stored_user(authenticator: &Authenticator, password: &str) -> User {
        let hash = authenticator.hash_password(password).unwrap();
        User::new(
            Handle::new("alice@example.com".to_string()).unwrap(),
            HashedSecret::new(hash),
            Role::user(),
            now(),
        )
    }

    fn login_command(handle: &str, password: &str) -> LoginCommand {
        LoginCommand {
            handle: handle.to_string(),
            password: password.to_string(),
            client: LoginClient::new(Some("203.0.113.7"), Some("test-agent/1.0")),
        }
    }

    #[tokio::test]
    async fn test_register_success() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_create()
            .withf(|user| {
                user.handle.as_str() == "alice@example.com"
                    && user.role.as_str() == "USER"
                    && user.active
                    && user.password_hash.expose().starts_with("$argon2id")
            })
            .times(1)
            .returning(|user| Ok(user));

        let service = service(repository, authenticator());

        let command = RegisterCommand::new(
            Handle::new("alice@example.com".to_string()).unwrap(),
            "Secr3t!".to_string(),
            Role::user(),
        );

        let user = service.register(command, now()).await.unwrap();
        assert_eq!(user.handle.as_str(), "alice@example.com");
        assert_eq!(user.created_at, now());
        assert!(user.last_login_at.is_none());
    }

    #[tokio::test]
    async fn test_register_duplicate_handle() {
        let mut repository = MockTestUserRepository::new();

        repository.expect_create().times(1).returning(|user| {
            Err(UserError::DuplicateHandle(user.handle.as_str().to_string()))
        });

        let service = service(repository, authenticator());

        let command = RegisterCommand::new(
            Handle::new("alice@example.com".to_string()).unwrap(),
            "Secr3t!".to_string(),
            Role::user(),
        );

        let result = service.register(command, now()).await;
        assert!(matches!(result, Err(AuthError::DuplicateHandle(_))));
    }

    #[tokio::test]
    async fn test_register_short_password() {
        let mut repository = MockTestUserRepository::new();
        repository.expect_create().times(0);

        let service = service(repository, authenticator());

        let command = RegisterCommand::new(
            Handle::new("alice@example.com".to_string()).unwrap(),
            "abc".to_string(),
            Role::user(),
        );

        let result = service.register(command, now()).await;
        assert!(matches!(result, Err(AuthError::InvalidPassword(_))));
    }

    #[tokio::test]
    async fn test_login_success_issues_verifiable_token() {
        let authenticator = authenticator();
        let user = stored_user(&authenticator, "Secr3t!");
        let user_id = user.id;

        let mut repository = MockTestUserRepository::new();
        let returned_user = user.clone();
        repository
            .expect_find_by_handle()
            .withf(|handle| handle.as_str() == "alice@example.com")
            .times(1)
            .returning(move |_| Ok(Some(returned_user.clone())));
        repository
            .expect_record_login()
            .withf(move |id, client, at| {
                *id == user_id
                    && client.ip_address() == "203.0.113.7"
                    && client.device_info() == "test-agent/1.0"
                    && *at == now()
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let service = service(repository, authenticator);

        let issued = service
            .login(login_command("Alice@Example.com", "Secr3t!"), now())
            .await
            .unwrap();
        assert_eq!(issued.expires_at, now() + Duration::seconds(TTL));

        let identity = service.authorize(&issued.token, now()).unwrap();
        assert_eq!(identity.user_id, user_id.0);
        assert_eq!(identity.handle, "alice@example.com");
        assert_eq!(identity.role, "USER");

        let expired = service.authorize(&issued.token, now() + Duration::seconds(TTL + 1));
        assert!(matches!(expired, Err(AuthError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let authenticator = authenticator();
        let user = stored_user(&authenticator, "Secr3t!");

        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_handle()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));
        repository.expect_record_login().times(0);

        let service = service(repository, authenticator);

        let result = service
            .login(login_command("alice@example.com", "wrong"), now())
            .await;
        assert!(matches!(result, Err(AuthError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_login_unknown_handle_is_indistinguishable() {
        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_handle()
            .times(1)
            .returning(|_| Ok(None));
        repository.expect_record_login().times(0);

        let service = service(repository, authenticator());

        let result = service
            .login(login_command("nobody@example.com", "Secr3t!"), now())
            .await;
        let err = result.unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized));
        assert_eq!(err.to_string(), "Unauthorized");
    }

    #[tokio::test]
    async fn test_login_invalid_handle_skips_lookup() {
        let mut repository = MockTestUserRepository::new();
        repository.expect_find_by_handle().times(0);

        let service = service(repository, authenticator());

        let result = service.login(login_command("not-an-email", "x"), now()).await;
        assert!(matches!(result, Err(AuthError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_login_inactive_user() {
        let authenticator = authenticator();
        let mut user = stored_user(&authenticator, "Secr3t!");
        user.active = false;

        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_handle()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));
        repository.expect_record_login().times(0);

        let service = service(repository, authenticator);

        let result = service
            .login(login_command("alice@example.com", "Secr3t!"), now())
            .await;
        assert!(matches!(result, Err(AuthError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_login_store_unavailable() {
        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_handle()
            .times(1)
            .returning(|_| Err(UserError::StoreUnavailable("connection refused".to_string())));

        let service = service(repository, authenticator());

        let result = service
            .login(login_command("alice@example.com", "Secr3t!"), now())
            .await;
        assert!(matches!(result, Err(AuthError::StoreUnavailable(_))));
    }

    #[tokio::test]
    async fn test_login_survives_failed_login_recording() {
        let authenticator = authenticator();
        let user = stored_user(&authenticator, "Secr3t!");

        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_handle()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));
        repository
            .expect_record_login()
            .times(1)
            .returning(|_, _, _| Err(UserError::StoreUnavailable("timeout".to_string())));

        let service = service(repository, authenticator);

        let result = service
            .login(login_command("alice@example.com", "Secr3t!"), now())
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_authorize_rejects_garbage() {
        let service = service(MockTestUserRepository::new(), authenticator());

        let result = service.authorize("invalid.token.here", now());
        assert!(matches!(result, Err(AuthError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_change_password_success() {
        let authenticator = authenticator();
        let user = stored_user(&authenticator, "Secr3t!");
        let user_id = user.id;
        let old_hash = user.password_hash.clone();

        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let checker = Arc::clone(&authenticator);
        repository
            .expect_update_password()
            .withf(move |id, hash, _| {
                *id == user_id
                    && *hash != old_hash
                    && checker.verify_password("N3w-secret", hash.expose()).unwrap()
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let service = service(repository, authenticator);

        let command = ChangePasswordCommand {
            current_password: "Secr3t!".to_string(),
            new_password: "N3w-secret".to_string(),
        };
        assert!(service.change_password(&user_id, command, now()).await.is_ok());
    }

    #[tokio::test]
    async fn test_change_password_wrong_current() {
        let authenticator = authenticator();
        let user = stored_user(&authenticator, "Secr3t!");
        let user_id = user.id;

        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));
        repository.expect_update_password().times(0);

        let service = service(repository, authenticator);

        let command = ChangePasswordCommand {
            current_password: "guess".to_string(),
            new_password: "N3w-secret".to_string(),
        };
        let result = service.change_password(&user_id, command, now()).await;
        assert!(matches!(result, Err(AuthError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_login_history_clamps_limit() {
        let user_id = UserId::new();
        let record = LoginRecord {
            user_id,
            client: LoginClient::default(),
            login_at: now(),
        };

        let mut repository = MockTestUserRepository::new();
        repository
            .expect_login_history()
            .withf(move |id, limit| *id == user_id && *limit == MAX_LOGIN_HISTORY)
            .times(1)
            .returning(move |_, _| Ok(vec![record.clone()]));
        repository
            .expect_login_history()
            .withf(|_, limit| *limit == 1)
            .times(1)
            .returning(|_, _| Ok(Vec::new()));

        let service = service(repository, authenticator());

        let history = service.login_history(&user_id, 10_000).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].client.ip_address(), LoginClient::UNKNOWN);

        assert!(service.login_history(&user_id, 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deactivate_not_found() {
        let mut repository = MockTestUserRepository::new();
        let user_id = UserId::new();

        repository
            .expect_deactivate()
            .times(1)
            .returning(move |id, _| Err(UserError::NotFound(id.to_string())));

        let service = service(repository, authenticator());

        let result = service.deactivate(&user_id, now()).await;
        assert!(matches!(result, Err(AuthError::NotFound(_))));
    }
}
