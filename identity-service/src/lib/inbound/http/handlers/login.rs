use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::extract::State;
use axum::http::header;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::authentication::models::LoginCommand;
use crate::domain::authentication::ports::AuthServicePort;
use crate::domain::user::models::LoginClient;
use crate::inbound::http::router::AppState;

const FORWARDED_FOR: &str = "x-forwarded-for";

pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    peer: Option<ConnectInfo<SocketAddr>>,
    Json(body): Json<LoginRequestBody>,
) -> Result<ApiSuccess<LoginResponseData>, ApiError> {
    let command = LoginCommand {
        handle: body.handle,
        password: body.password,
        client: login_client(&headers, peer.map(|ConnectInfo(addr)| addr)),
    };

    let issued = state.auth_service.login(command, Utc::now()).await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        LoginResponseData {
            token: issued.token,
            token_type: "Bearer".to_string(),
            expires_at: issued.expires_at,
        },
    ))
}

/// Client address is the first `X-Forwarded-For` entry, else the peer
/// address of the connection.
fn login_client(headers: &HeaderMap, peer: Option<SocketAddr>) -> LoginClient {
    let forwarded = headers
        .get(FORWARDED_FOR)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string);

    let ip_address = forwarded.or_else(|| peer.map(|addr| addr.ip().to_string()));
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok());

    LoginClient::new(ip_address.as_deref(), user_agent)
}

#[derive(Clone, Deserialize)]
pub struct LoginRequestBody {
    handle: String,
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponseData {
    pub token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
}
