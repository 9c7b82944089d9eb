//! Authentication utilities library
//!
//! Provides the credential core used by the identity service:
//! - Password hashing (Argon2id, configurable cost)
//! - Access token issuance and verification (HS256 JWT)
//! - Authentication coordination
//!
//! Every time-dependent operation takes the current time as an argument, so
//! expiry behaviour is deterministic under test.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Tokens
//! ```
//! use auth::{SigningKey, TokenError, TokenIssuer, TokenVerifier};
//! use chrono::{Duration, Utc};
//! use uuid::Uuid;
//!
//! let key = SigningKey::new(b"secret_key_at_least_32_bytes_long!").unwrap();
//! let issuer = TokenIssuer::new(key.clone(), 3600).unwrap();
//! let verifier = TokenVerifier::new(key);
//!
//! let now = Utc::now();
//! let issued = issuer.issue(Uuid::new_v4(), "alice@example.com", "USER", now).unwrap();
//!
//! let identity = verifier.verify(&issued.token, now).unwrap();
//! assert_eq!(identity.handle, "alice@example.com");
//!
//! let later = now + Duration::seconds(3601);
//! assert_eq!(verifier.verify(&issued.token, later), Err(TokenError::Expired));
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::{Authenticator, PasswordHasher, SigningKey, StoredCredential, TokenIssuer, TokenVerifier};
//! use chrono::Utc;
//! use uuid::Uuid;
//!
//! let key = SigningKey::new(b"secret_key_at_least_32_bytes_long!").unwrap();
//! let auth = Authenticator::new(
//!     PasswordHasher::new(),
//!     TokenIssuer::new(key.clone(), 3600).unwrap(),
//!     TokenVerifier::new(key),
//! )
//! .unwrap();
//!
//! // Register: hash password
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Login: verify and issue token
//! let account = StoredCredential {
//!     user_id: Uuid::new_v4(),
//!     handle: "alice@example.com",
//!     role: "USER",
//!     password_hash: &hash,
//! };
//! let issued = auth.authenticate("password123", Some(account), Utc::now()).unwrap();
//!
//! // Validate token
//! let identity = auth.validate_token(&issued.token, Utc::now()).unwrap();
//! assert_eq!(identity.role, "USER");
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use authenticator::StoredCredential;
pub use jwt::Claims;
pub use jwt::Identity;
pub use jwt::IssuedToken;
pub use jwt::SigningKey;
pub use jwt::TokenError;
pub use jwt::TokenIssuer;
pub use jwt::TokenVerifier;
pub use password::HashingCost;
pub use password::PasswordError;
pub use password::PasswordHasher;
