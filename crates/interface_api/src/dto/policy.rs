//! Policy DTOs

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{Page, PageRequest};
use domain_policy::{
    CoveragePricing, Policy, PolicyQuery, PolicyStatus, PolicyUpdate, PolicyVerification,
    PolicyWithClient,
};

use super::{double_option, Pagination};
use crate::error::ApiError;

/// Query string of `GET /api/policies`
///
/// `estado` is accepted as an alias of `status`; an empty value means no filter.
#[derive(Debug, Default, Deserialize)]
pub struct PolicyListParams {
    pub search: Option<String>,
    #[serde(alias = "estado")]
    pub status: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl TryFrom<PolicyListParams> for PolicyQuery {
    type Error = ApiError;

    fn try_from(params: PolicyListParams) -> Result<Self, Self::Error> {
        let status = match params.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(value) => Some(value.parse::<PolicyStatus>()?),
        };
        Ok(PolicyQuery {
            status,
            search: params.search.filter(|s| !s.trim().is_empty()),
            page: PageRequest::new(params.page, params.limit),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePolicyRequest {
    pub status: Option<PolicyStatus>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
    pub coverage_name: Option<String>,
    pub end_date: Option<NaiveDate>,
}

impl From<UpdatePolicyRequest> for PolicyUpdate {
    fn from(request: UpdatePolicyRequest) -> Self {
        PolicyUpdate {
            status: request.status,
            notes: request.notes,
            coverage_name: request.coverage_name,
            end_date: request.end_date,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PolicyListResponse {
    pub policies: Vec<PolicyWithClient>,
    pub pagination: Pagination,
}

impl From<Page<PolicyWithClient>> for PolicyListResponse {
    fn from(page: Page<PolicyWithClient>) -> Self {
        let pagination = Pagination::from(&page);
        Self {
            policies: page.items,
            pagination,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PolicyEnvelope {
    pub policy: PolicyWithClient,
}

#[derive(Debug, Serialize)]
pub struct PolicyMessageResponse {
    pub message: String,
    pub policy: Policy,
}

/// Catalog pricing keyed by coverage name
#[derive(Debug, Serialize)]
pub struct PricingConfigResponse {
    pub pricing: BTreeMap<String, CoveragePricing>,
}

#[derive(Debug, Serialize)]
pub struct VerificationResponse {
    pub policy: PolicyVerification,
}
