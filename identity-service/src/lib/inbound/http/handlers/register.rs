use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::authentication::models::RegisterCommand;
use crate::domain::authentication::ports::AuthServicePort;
use crate::domain::user::models::Handle;
use crate::domain::user::models::Role;
use crate::domain::user::models::User;
use crate::inbound::http::router::AppState;
use crate::user::errors::HandleError;

/// Self-service registration. Accounts created here always get the `USER` role.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequestBody>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    state
        .auth_service
        .register(body.try_into_command()?, Utc::now())
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::CREATED, user.into()))
}

/// HTTP request body for registering (raw JSON)
#[derive(Clone, Deserialize)]
pub struct RegisterRequestBody {
    handle: String,
    password: String,
}

#[derive(Debug, Clone, Error)]
enum ParseRegisterRequestError {
    #[error("Invalid handle: {0}")]
    Handle(#[from] HandleError),
}

impl RegisterRequestBody {
    fn try_into_command(self) -> Result<RegisterCommand, ParseRegisterRequestError> {
        let handle = Handle::new(self.handle)?;
        Ok(RegisterCommand::new(handle, self.password, Role::user()))
    }
}

impl From<ParseRegisterRequestError> for ApiError {
    fn from(err: ParseRegisterRequestError) -> Self {
        ApiError::UnprocessableEntity(err.to_string())
    }
}

/// Public view of a user. Never includes the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserData {
    pub id: String,
    pub handle: String,
    pub role: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserData {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            handle: user.handle.as_str().to_string(),
            role: user.role.as_str().to_string(),
            active: user.active,
            created_at: user.created_at,
        }
    }
}
