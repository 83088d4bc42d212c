//! API middleware

use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{info, warn};

use crate::auth::{bearer_token, validate_token, CurrentUser};
use crate::error::ApiError;
use crate::AppState;

/// Authentication middleware
///
/// Validates the bearer token, then re-loads the account so that a
/// deactivated user or a changed role takes effect on the next request.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    match authenticate(&state, request.headers()).await {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => {
            warn!(uri = %request.uri(), error = %e, "Authentication failed");
            e.into_response()
        }
    }
}

async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<CurrentUser, ApiError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());
    let token = bearer_token(header)?;
    let claims = validate_token(token, &state.config.jwt_secret)?;
    let user = state.users.current(claims.user_id()?).await?;
    Ok(CurrentUser(user.view()))
}

/// Audit logging middleware
///
/// Logs every API request with the acting user and the outcome.
pub async fn audit_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let user = request
        .extensions()
        .get::<CurrentUser>()
        .map(|u| u.0.username.clone())
        .unwrap_or_else(|| "anonymous".to_string());

    let start = Instant::now();
    let response = next.run(request).await;

    info!(
        method = %method,
        uri = %uri,
        user = %user,
        status = response.status().as_u16(),
        duration_ms = start.elapsed().as_millis() as u64,
        "API request"
    );

    response
}
