use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use chrono::Utc;

use crate::domain::authentication::ports::AuthServicePort;
use crate::domain::user::models::Role;
use crate::domain::user::models::UserId;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::router::AppState;

/// Soft-deactivate an account. Allowed for the account owner and for admins.
pub async fn deactivate_user(
    State(state): State<AppState>,
    Extension(caller): Extension<auth::Identity>,
    Path(id): Path<String>,
) -> Result<ApiSuccess<()>, ApiError> {
    let user_id = UserId::from_string(&id).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    if caller.user_id != user_id.0 && caller.role != Role::ADMIN {
        return Err(ApiError::Forbidden(
            "Cannot deactivate another user's account".to_string(),
        ));
    }

    state
        .auth_service
        .deactivate(&user_id, Utc::now())
        .await
        .map_err(ApiError::from)
        .map(|_| ApiSuccess::new(StatusCode::NO_CONTENT, ()))
}
