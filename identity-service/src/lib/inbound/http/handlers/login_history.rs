use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::authentication::ports::AuthServicePort;
use crate::domain::user::models::LoginRecord;
use crate::domain::user::models::UserId;
use crate::inbound::http::router::AppState;

const DEFAULT_LIMIT: usize = 20;

/// Recent logins of the calling user, newest first.
pub async fn login_history(
    State(state): State<AppState>,
    Extension(identity): Extension<auth::Identity>,
    Query(params): Query<LoginHistoryParams>,
) -> Result<ApiSuccess<Vec<LoginRecordData>>, ApiError> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);

    state
        .auth_service
        .login_history(&UserId(identity.user_id), limit)
        .await
        .map_err(ApiError::from)
        .map(|records| {
            ApiSuccess::new(
                StatusCode::OK,
                records.iter().map(LoginRecordData::from).collect(),
            )
        })
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginHistoryParams {
    limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginRecordData {
    pub ip_address: String,
    pub device_info: String,
    pub login_at: DateTime<Utc>,
}

impl From<&LoginRecord> for LoginRecordData {
    fn from(record: &LoginRecord) -> Self {
        Self {
            ip_address: record.client.ip_address().to_string(),
            device_info: record.client.device_info().to_string(),
            login_at: record.login_at,
        }
    }
}
