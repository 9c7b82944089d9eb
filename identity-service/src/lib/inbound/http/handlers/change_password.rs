use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::authentication::models::ChangePasswordCommand;
use crate::domain::authentication::ports::AuthServicePort;
use crate::domain::user::models::UserId;
use crate::inbound::http::router::AppState;

pub async fn change_password(
    State(state): State<AppState>,
    Extension(identity): Extension<auth::Identity>,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<ApiSuccess<()>, ApiError> {
    let command = ChangePasswordCommand {
        current_password: body.current_password,
        new_password: body.new_password,
    };

    state
        .auth_service
        .change_password(&UserId(identity.user_id), command, Utc::now())
        .await
        .map_err(ApiError::from)
        .map(|_| ApiSuccess::new(StatusCode::NO_CONTENT, ()))
}

#[derive(Clone, Deserialize)]
pub struct ChangePasswordRequest {
    current_password: String,
    new_password: String,
}
