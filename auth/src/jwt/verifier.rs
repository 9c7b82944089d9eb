use chrono::DateTime;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::claims::Identity;
use super::errors::TokenError;
use super::issuer::timestamp_to_datetime;
use super::keys::SigningKey;

/// Verifies HS256-signed access tokens.
///
/// Verification is a pure function of the token, the signing key and the
/// caller-supplied current time. Nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    key: SigningKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(key: SigningKey) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the caller's clock below, not the system clock
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.required_spec_claims.clear();

        Self { key, validation }
    }

    /// Only accept tokens carrying this `iss` claim.
    pub fn with_issuer(mut self, issuer: &str) -> Self {
        self.validation.set_issuer(&[issuer]);
        self
    }

    /// Verify a token and resolve the identity it was issued for.
    ///
    /// The signature is checked before any claim is trusted.
    ///
    /// # Errors
    /// * `BadSignature` - Signature does not match the signing key
    /// * `Expired` - Token expiry is at or before `now`
    /// * `Malformed` - Token structure, algorithm or claims are invalid
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, TokenError> {
        let token_data = decode::<Claims>(token, self.key.decoding_key(), &self.validation)?;
        let claims = token_data.claims;

        if claims.exp <= claims.iat {
            return Err(TokenError::Malformed(
                "Expiry is not after issue time".to_string(),
            ));
        }

        if claims.is_expired(now.timestamp()) {
            return Err(TokenError::Expired);
        }

        Ok(Identity {
            user_id: claims.uid,
            handle: claims.sub,
            role: claims.role,
            issued_at: timestamp_to_datetime(claims.iat)?,
            expires_at: timestamp_to_datetime(claims.exp)?,
        })
    }
}
