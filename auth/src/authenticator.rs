use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use uuid::Uuid;

use crate::jwt::Identity;
use crate::jwt::IssuedToken;
use crate::jwt::TokenError;
use crate::jwt::TokenIssuer;
use crate::jwt::TokenVerifier;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password verification and token handling.
///
/// Provides high-level authentication operations by coordinating
/// password hashing, token issuance and token verification.
#[derive(Debug, Clone)]
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_issuer: TokenIssuer,
    token_verifier: TokenVerifier,
    decoy_hash: String,
}

/// Stored account data needed to check a login attempt.
#[derive(Debug, Clone, Copy)]
pub struct StoredCredential<'a> {
    pub user_id: Uuid,
    pub handle: &'a str,
    pub role: &'a str,
    pub password_hash: &'a str,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("Token error: {0}")]
    TokenError(#[from] TokenError),
}

impl Authenticator {
    /// Create a new authenticator from its collaborators.
    ///
    /// Hashes a throwaway password once so that attempts against unknown
    /// accounts spend the same hashing work as attempts against real ones.
    ///
    /// # Errors
    /// * `PasswordError` - Decoy hash could not be computed
    pub fn new(
        password_hasher: PasswordHasher,
        token_issuer: TokenIssuer,
        token_verifier: TokenVerifier,
    ) -> Result<Self, PasswordError> {
        let decoy_hash = password_hasher.hash(&Uuid::new_v4().to_string())?;

        Ok(Self {
            password_hasher,
            token_issuer,
            token_verifier,
            decoy_hash,
        })
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Check a password against a stored hash.
    ///
    /// # Errors
    /// * `PasswordError` - Stored hash is unreadable
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
        self.password_hasher.verify(password, stored_hash)
    }

    /// Verify credentials and issue an access token.
    ///
    /// `account` is `None` when no usable account exists for the presented
    /// handle. The password is then checked against the decoy hash and the
    /// attempt fails exactly like a wrong password.
    ///
    /// # Errors
    /// * `InvalidCredentials` - No account, or password does not match
    /// * `PasswordError` - Password verification failed
    /// * `TokenError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        account: Option<StoredCredential<'_>>,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthenticationError> {
        let Some(account) = account else {
            let _ = self.password_hasher.verify(password, &self.decoy_hash);
            return Err(AuthenticationError::InvalidCredentials);
        };

        if !self.password_hasher.verify(password, account.password_hash)? {
            return Err(AuthenticationError::InvalidCredentials);
        }

        let issued = self
            .token_issuer
            .issue(account.user_id, account.handle, account.role, now)?;

        Ok(issued)
    }

    /// Issue a token without password verification.
    ///
    /// For flows where the caller has already been authenticated by other means.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token generation failed
    pub fn issue_token(
        &self,
        user_id: Uuid,
        handle: &str,
        role: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        self.token_issuer.issue(user_id, handle, role, now)
    }

    /// Validate a token and resolve its identity.
    ///
    /// # Errors
    /// * `Expired`, `BadSignature`, `Malformed` - Token rejected
    pub fn validate_token(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, TokenError> {
        self.token_verifier.verify(token, now)
    }

    /// Lifetime of issued tokens.
    pub fn token_ttl(&self) -> Duration {
        self.token_issuer.ttl()
    }
}
