//! Public policy verification

use axum::{extract::State, Json};
use tracing::debug;

use crate::dto::policy::VerificationResponse;
use crate::error::ApiError;
use crate::handlers::ApiPath;
use crate::AppState;

/// Looks a policy up by the trailing digits of its number
///
/// Unauthenticated. When several numbers share the suffix the most recent
/// policy wins.
pub async fn verify_policy(
    State(state): State<AppState>,
    ApiPath(number): ApiPath<String>,
) -> Result<Json<VerificationResponse>, ApiError> {
    debug!(fragment = %number, "Policy verification");
    let policy = state.policies.verify(&number).await?;
    Ok(Json(VerificationResponse { policy }))
}
