//! Policy handlers

use axum::{extract::State, http::StatusCode, Json};
use tracing::info;

use core_kernel::PolicyId;
use domain_access::Action;
use domain_policy::{NewPolicy, PolicyQuery};

use crate::auth::CurrentUser;
use crate::dto::policy::{
    PolicyEnvelope, PolicyListParams, PolicyListResponse, PolicyMessageResponse,
    PricingConfigResponse, UpdatePolicyRequest,
};
use crate::dto::MessageResponse;
use crate::error::ApiError;
use crate::handlers::{ApiJson, ApiPath, ApiQuery};
use crate::AppState;

/// Lists policies with their client data, newest first
pub async fn list_policies(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiQuery(params): ApiQuery<PolicyListParams>,
) -> Result<Json<PolicyListResponse>, ApiError> {
    user.require(Action::PoliciesRead)?;
    let query = PolicyQuery::try_from(params)?;
    let page = state.policies.list(query).await?;
    Ok(Json(page.into()))
}

/// Pricing of every active coverage, keyed by name
pub async fn pricing_config(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<PricingConfigResponse>, ApiError> {
    user.require(Action::PoliciesRead)?;
    let pricing = state.policies.pricing_config().await?;
    Ok(Json(PricingConfigResponse { pricing }))
}

pub async fn get_policy(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<PolicyId>,
) -> Result<Json<PolicyEnvelope>, ApiError> {
    user.require(Action::PoliciesRead)?;
    let policy = state.policies.get(id).await?;
    Ok(Json(PolicyEnvelope { policy }))
}

/// Issues a policy numbered from the sequence and priced from its coverage
pub async fn create_policy(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(request): ApiJson<NewPolicy>,
) -> Result<(StatusCode, Json<PolicyMessageResponse>), ApiError> {
    user.require(Action::PoliciesWrite)?;
    let policy = state.policies.create(request, Some(user.id())).await?;
    Ok((
        StatusCode::CREATED,
        Json(PolicyMessageResponse {
            message: "Policy issued".to_string(),
            policy,
        }),
    ))
}

pub async fn update_policy(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<PolicyId>,
    ApiJson(request): ApiJson<UpdatePolicyRequest>,
) -> Result<Json<PolicyMessageResponse>, ApiError> {
    user.require(Action::PoliciesWrite)?;
    let policy = state.policies.update(id, request.into()).await?;
    Ok(Json(PolicyMessageResponse {
        message: "Policy updated".to_string(),
        policy,
    }))
}

/// Renews for one year from today in the agency timezone
pub async fn renew_policy(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<PolicyId>,
) -> Result<Json<PolicyMessageResponse>, ApiError> {
    user.require(Action::PoliciesRenew)?;
    let today = state.timezone.today();
    let policy = state.policies.renew(id, today).await?;
    info!(policy_id = %id, renewed_by = %user.id(), %today, "Policy renewed");
    Ok(Json(PolicyMessageResponse {
        message: "Policy renewed".to_string(),
        policy,
    }))
}

pub async fn delete_policy(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<PolicyId>,
) -> Result<Json<MessageResponse>, ApiError> {
    user.require(Action::PoliciesDelete)?;
    state.policies.delete(id).await?;
    Ok(Json(MessageResponse::new("Policy deleted")))
}
