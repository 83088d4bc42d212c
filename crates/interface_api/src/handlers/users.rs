//! User management handlers
//!
//! Role and target checks live in `UserService`; a user may always edit
//! their own profile, so `update_user` does not require `users.manage` up
//! front.

use axum::{extract::State, http::StatusCode, Json};

use core_kernel::UserId;
use domain_access::{NewUser, UserUpdate};

use crate::auth::CurrentUser;
use crate::dto::user::{UserMessageResponse, UsersResponse};
use crate::dto::MessageResponse;
use crate::error::ApiError;
use crate::handlers::{ApiJson, ApiPath};
use crate::AppState;

pub async fn list_users(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<UsersResponse>, ApiError> {
    let users = state.users.list(&user.actor()).await?;
    Ok(Json(UsersResponse {
        users: users.iter().map(|u| u.view()).collect(),
    }))
}

pub async fn create_user(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(request): ApiJson<NewUser>,
) -> Result<(StatusCode, Json<UserMessageResponse>), ApiError> {
    let created = state.users.create(&user.actor(), request).await?;
    Ok((
        StatusCode::CREATED,
        Json(UserMessageResponse {
            message: "User created".to_string(),
            user: created.view(),
        }),
    ))
}

pub async fn update_user(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<UserId>,
    ApiJson(request): ApiJson<UserUpdate>,
) -> Result<Json<UserMessageResponse>, ApiError> {
    let updated = state.users.update(&user.actor(), id, request).await?;
    Ok(Json(UserMessageResponse {
        message: "User updated".to_string(),
        user: updated.view(),
    }))
}

pub async fn delete_user(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<UserId>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.users.delete(&user.actor(), id).await?;
    Ok(Json(MessageResponse::new("User deleted")))
}
