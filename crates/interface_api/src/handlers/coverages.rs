//! Coverage catalog handlers

use axum::{extract::State, http::StatusCode, Json};

use core_kernel::CoverageId;
use domain_access::Action;
use domain_policy::NewCoverage;

use crate::auth::CurrentUser;
use crate::dto::coverage::{
    CoverageEnvelope, CoverageListParams, CoverageListResponse, CoverageMessageResponse,
    CoveragePricingResponse, UpdateCoverageRequest,
};
use crate::dto::MessageResponse;
use crate::error::ApiError;
use crate::handlers::{ApiJson, ApiPath, ApiQuery};
use crate::AppState;

pub async fn list_coverages(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiQuery(params): ApiQuery<CoverageListParams>,
) -> Result<Json<CoverageListResponse>, ApiError> {
    user.require(Action::CoveragesRead)?;
    let coverages = state.coverages.list(params.include_inactive()).await?;
    Ok(Json(CoverageListResponse { coverages }))
}

/// Live pricing of an active coverage by name
pub async fn coverage_pricing(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(name): ApiPath<String>,
) -> Result<Json<CoveragePricingResponse>, ApiError> {
    user.require(Action::CoveragesRead)?;
    let priced = state.coverages.pricing(&name).await?;
    Ok(Json(priced.into()))
}

pub async fn get_coverage(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<CoverageId>,
) -> Result<Json<CoverageEnvelope>, ApiError> {
    user.require(Action::CoveragesRead)?;
    let coverage = state.coverages.get(id).await?;
    Ok(Json(CoverageEnvelope { coverage }))
}

pub async fn create_coverage(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(request): ApiJson<NewCoverage>,
) -> Result<(StatusCode, Json<CoverageMessageResponse>), ApiError> {
    user.require(Action::CoveragesWrite)?;
    let coverage = state.coverages.create(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(CoverageMessageResponse {
            message: "Coverage created".to_string(),
            coverage,
        }),
    ))
}

/// Updates a coverage; existing policies keep the name they were priced with
pub async fn update_coverage(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<CoverageId>,
    ApiJson(request): ApiJson<UpdateCoverageRequest>,
) -> Result<Json<CoverageMessageResponse>, ApiError> {
    user.require(Action::CoveragesWrite)?;
    let coverage = state.coverages.update(id, request.into()).await?;
    Ok(Json(CoverageMessageResponse {
        message: "Coverage updated".to_string(),
        coverage,
    }))
}

/// Deletes a coverage no policy refers to
pub async fn delete_coverage(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<CoverageId>,
) -> Result<Json<MessageResponse>, ApiError> {
    user.require(Action::CoveragesDelete)?;
    state.coverages.delete(id).await?;
    Ok(Json(MessageResponse::new("Coverage deleted")))
}
