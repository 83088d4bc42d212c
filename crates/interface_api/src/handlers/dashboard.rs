//! Dashboard handler

use axum::{extract::State, Json};

use domain_access::Action;
use domain_policy::DashboardStats;

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::AppState;

/// Headline figures, recent activity and active-policy breakdowns
pub async fn stats(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<DashboardStats>, ApiError> {
    user.require(Action::DashboardRead)?;
    Ok(Json(state.stats.dashboard().await?))
}
