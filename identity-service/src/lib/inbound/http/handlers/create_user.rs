use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use super::register::UserData;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::authentication::errors::AuthError;
use crate::domain::authentication::models::RegisterCommand;
use crate::domain::authentication::ports::AuthServicePort;
use crate::domain::user::models::Handle;
use crate::domain::user::models::Role;
use crate::inbound::http::router::AppState;

/// Administrative account creation with an explicit role.
pub async fn create_user(
    State(state): State<AppState>,
    Extension(caller): Extension<auth::Identity>,
    Json(body): Json<CreateUserRequest>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    if caller.role != Role::ADMIN {
        tracing::warn!(user_id = %caller.user_id, "Non-admin attempted to create a user");
        return Err(ApiError::Forbidden("Administrator role required".to_string()));
    }

    state
        .auth_service
        .register(body.try_into_command()?, Utc::now())
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::CREATED, user.into()))
}

/// HTTP request body for creating a user (raw JSON)
#[derive(Clone, Deserialize)]
pub struct CreateUserRequest {
    handle: String,
    password: String,
    role: String,
}

impl CreateUserRequest {
    fn try_into_command(self) -> Result<RegisterCommand, AuthError> {
        let handle = Handle::new(self.handle)?;
        let role = Role::new(self.role)?;
        Ok(RegisterCommand::new(handle, self.password, role))
    }
}
