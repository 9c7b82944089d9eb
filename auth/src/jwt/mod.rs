pub mod claims;
pub mod errors;
pub mod issuer;
pub mod keys;
pub mod verifier;

pub use claims::Claims;
pub use claims::Identity;
pub use errors::TokenError;
pub use issuer::IssuedToken;
pub use issuer::TokenIssuer;
pub use keys::SigningKey;
pub use verifier::TokenVerifier;
