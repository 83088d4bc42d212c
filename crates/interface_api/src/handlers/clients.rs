//! Client handlers

use axum::{extract::State, http::StatusCode, Json};

use core_kernel::ClientId;
use domain_access::Action;
use domain_party::NewClient;

use crate::auth::CurrentUser;
use crate::dto::client::{
    ClientDetailResponse, ClientListParams, ClientListResponse, ClientMessageResponse,
    UpdateClientRequest,
};
use crate::dto::MessageResponse;
use crate::error::ApiError;
use crate::handlers::{ApiJson, ApiPath, ApiQuery};
use crate::AppState;

/// Lists active clients, newest first
pub async fn list_clients(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiQuery(params): ApiQuery<ClientListParams>,
) -> Result<Json<ClientListResponse>, ApiError> {
    user.require(Action::ClientsRead)?;
    let page = state.clients.list(params.into()).await?;
    Ok(Json(page.into()))
}

/// Gets a client together with its policies
pub async fn get_client(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<ClientId>,
) -> Result<Json<ClientDetailResponse>, ApiError> {
    user.require(Action::ClientsRead)?;
    let client = state.clients.get(id).await?;
    let policies = state.policies.list_for_client(id).await?;
    Ok(Json(ClientDetailResponse { client, policies }))
}

pub async fn create_client(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(request): ApiJson<NewClient>,
) -> Result<(StatusCode, Json<ClientMessageResponse>), ApiError> {
    user.require(Action::ClientsWrite)?;
    let client = state.clients.create(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ClientMessageResponse {
            message: "Client created".to_string(),
            client,
        }),
    ))
}

pub async fn update_client(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<ClientId>,
    ApiJson(request): ApiJson<UpdateClientRequest>,
) -> Result<Json<ClientMessageResponse>, ApiError> {
    user.require(Action::ClientsWrite)?;
    let client = state.clients.update(id, request.into()).await?;
    Ok(Json(ClientMessageResponse {
        message: "Client updated".to_string(),
        client,
    }))
}

/// Deletes a client; refused while any policy references it
pub async fn delete_client(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<ClientId>,
) -> Result<Json<MessageResponse>, ApiError> {
    user.require(Action::ClientsDelete)?;
    state.clients.delete(id).await?;
    Ok(Json(MessageResponse::new("Client deleted")))
}
