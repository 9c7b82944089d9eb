use std::fmt;

use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;

use super::errors::TokenError;

/// Process-wide HMAC signing key.
///
/// Built once at startup from configuration and shared read-only by the
/// issuer and the verifier.
#[derive(Clone)]
pub struct SigningKey {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl SigningKey {
    /// Minimum secret length for HS256 (256 bits).
    pub const MIN_SECRET_LENGTH: usize = 32;

    /// Create a signing key from a secret.
    ///
    /// # Errors
    /// * `KeyTooShort` - Secret is shorter than 32 bytes
    pub fn new(secret: &[u8]) -> Result<Self, TokenError> {
        if secret.len() < Self::MIN_SECRET_LENGTH {
            return Err(TokenError::KeyTooShort {
                min: Self::MIN_SECRET_LENGTH,
                actual: secret.len(),
            });
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        })
    }

    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    pub(crate) fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_short_secret() {
        let result = SigningKey::new(b"too-short");
        assert_eq!(
            result.unwrap_err(),
            TokenError::KeyTooShort { min: 32, actual: 9 }
        );
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let key = SigningKey::new(b"secret_key_at_least_32_bytes_long!").unwrap();
        assert_eq!(format!("{:?}", key), "SigningKey(<redacted>)");
    }
}
