//! Bearer token middleware

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

use super::error::ApiError;
use super::AppState;
use crate::auth::{bearer_token, verify};

/// Name of the caller, taken from a verified token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser(pub String);

/// Reject requests without a valid bearer token
///
/// On success the token's user is available to handlers as
/// `Extension<AuthUser>`.
pub async fn require_bearer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)
        .ok_or_else(ApiError::unauthorized)?;

    let claims = verify(token, state.settings.session_secret.as_bytes())?;
    request.extensions_mut().insert(AuthUser(claims.user));
    Ok(next.run(request).await)
}
