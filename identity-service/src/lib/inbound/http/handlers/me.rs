use axum::http::StatusCode;
use axum::Extension;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;

/// Echo the identity resolved from the caller's bearer token.
pub async fn me(
    Extension(identity): Extension<auth::Identity>,
) -> Result<ApiSuccess<IdentityData>, ApiError> {
    Ok(ApiSuccess::new(StatusCode::OK, (&identity).into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityData {
    pub user_id: String,
    pub handle: String,
    pub role: String,
    pub expires_at: DateTime<Utc>,
}

impl From<&auth::Identity> for IdentityData {
    fn from(identity: &auth::Identity) -> Self {
        Self {
            user_id: identity.user_id.to_string(),
            handle: identity.handle.clone(),
            role: identity.role.clone(),
            expires_at: identity.expires_at,
        }
    }
}
