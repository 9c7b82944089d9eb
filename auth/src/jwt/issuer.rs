use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::Header;
use uuid::Uuid;

use super::claims::Claims;
use super::errors::TokenError;
use super::keys::SigningKey;

/// Freshly signed access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Issues HS256-signed access tokens.
///
/// Stateless: the only inputs are the signing key, the configured lifetime and
/// the caller-supplied current time.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    key: SigningKey,
    ttl: Duration,
    issuer: Option<String>,
}

impl TokenIssuer {
    /// Longest accepted token lifetime, one leap year.
    pub const MAX_TTL_SECONDS: i64 = 366 * 24 * 60 * 60;

    /// Create a token issuer.
    ///
    /// # Arguments
    /// * `key` - Process-wide signing key
    /// * `ttl_seconds` - Token lifetime in seconds
    ///
    /// # Errors
    /// * `InvalidTtl` - Lifetime is not within `1..=MAX_TTL_SECONDS`
    pub fn new(key: SigningKey, ttl_seconds: i64) -> Result<Self, TokenError> {
        if !(1..=Self::MAX_TTL_SECONDS).contains(&ttl_seconds) {
            return Err(TokenError::InvalidTtl(ttl_seconds));
        }

        let ttl = Duration::try_seconds(ttl_seconds).ok_or(TokenError::InvalidTtl(ttl_seconds))?;

        Ok(Self {
            key,
            ttl,
            issuer: None,
        })
    }

    /// Stamp issued tokens with an `iss` claim.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Configured token lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for a user.
    ///
    /// Timestamps are truncated to whole seconds, so `expires_at` is
    /// `now + ttl` at second precision.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed, or `now + ttl` is not
    ///   representable
    pub fn issue(
        &self,
        user_id: Uuid,
        handle: &str,
        role: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let iat = now.timestamp();
        let exp = iat
            .checked_add(self.ttl.num_seconds())
            .filter(|exp| DateTime::from_timestamp(*exp, 0).is_some())
            .ok_or_else(|| TokenError::EncodingFailed("Token expiry out of range".to_string()))?;

        let claims = Claims {
            sub: handle.to_string(),
            uid: user_id,
            role: role.to_string(),
            iat,
            exp,
            jti: Uuid::new_v4().to_string(),
            iss: self.issuer.clone(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, self.key.encoding_key())
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))?;

        Ok(IssuedToken {
            token,
            issued_at: timestamp_to_datetime(iat)?,
            expires_at: timestamp_to_datetime(exp)?,
        })
    }
}

pub(crate) fn timestamp_to_datetime(timestamp: i64) -> Result<DateTime<Utc>, TokenError> {
    DateTime::from_timestamp(timestamp, 0)
        .ok_or_else(|| TokenError::Malformed(format!("Timestamp out of range: {}", timestamp)))
}
