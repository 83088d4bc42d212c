//! Authentication handlers

use axum::{extract::State, http::StatusCode, Json};

use crate::auth::{create_token, CurrentUser};
use crate::dto::auth::{AuthResponse, LoginRequest, MeResponse, RegisterRequest};
use crate::error::ApiError;
use crate::handlers::ApiJson;
use crate::AppState;

/// Exchanges a username and password for a token
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = state
        .users
        .authenticate(&request.username, &request.password)
        .await?;
    let token = create_token(&user, &state.config.jwt_secret, state.config.jwt_expiration_secs)?;

    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        token,
        user: user.view(),
    }))
}

/// Creates the first account while no user exists
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let user = state.users.register_first(request.into()).await?;
    let token = create_token(&user, &state.config.jwt_secret, state.config.jwt_expiration_secs)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "Administrator account created".to_string(),
            token,
            user: user.view(),
        }),
    ))
}

pub async fn me(user: CurrentUser) -> Json<MeResponse> {
    Json(MeResponse { user: user.0 })
}
