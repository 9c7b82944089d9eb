use axum::extract::Request;
use axum::extract::State;
use axum::http;
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;

use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Middleware that verifies bearer tokens and adds the resolved
/// `auth::Identity` to request extensions.
///
/// Every failure answers the same 401; the specific reason is only logged.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token_from_header(&req)?;

    let identity = state.auth_service.authorize(token, Utc::now())?;

    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

fn extract_token_from_header(req: &Request) -> Result<&str, ApiError> {
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .ok_or_else(|| {
            tracing::debug!("Missing Authorization header");
            ApiError::unauthorized()
        })?;

    let auth_str = auth_header.to_str().map_err(|_| {
        tracing::debug!("Authorization header is not valid ASCII");
        ApiError::unauthorized()
    })?;

    bearer_token(auth_str).ok_or_else(|| {
        tracing::debug!("Authorization header is not a bearer credential");
        ApiError::unauthorized()
    })
}

/// Extract the credential from a `Bearer <token>` header value.
///
/// The scheme name is case insensitive.
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    let token = token.trim();

    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}
