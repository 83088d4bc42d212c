//! Coverage DTOs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use domain_policy::{Coverage, CoverageSlot, CoverageUpdate, PricedItem, Pricing};

use super::double_option;

/// Query string of `GET /api/coverages`
#[derive(Debug, Default, Deserialize)]
pub struct CoverageListParams {
    pub all: Option<String>,
}

impl CoverageListParams {
    /// `?all=1` or `?all=true` includes inactive coverages
    pub fn include_inactive(&self) -> bool {
        matches!(self.all.as_deref(), Some("1") | Some("true"))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateCoverageRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub premium: Option<Decimal>,
    pub slots: Option<Vec<CoverageSlot>>,
    pub is_active: Option<bool>,
}

impl From<UpdateCoverageRequest> for CoverageUpdate {
    fn from(request: UpdateCoverageRequest) -> Self {
        CoverageUpdate {
            name: request.name,
            description: request.description,
            premium: request.premium,
            slots: request.slots,
            is_active: request.is_active,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CoverageListResponse {
    pub coverages: Vec<Coverage>,
}

#[derive(Debug, Serialize)]
pub struct CoverageEnvelope {
    pub coverage: Coverage,
}

#[derive(Debug, Serialize)]
pub struct CoverageMessageResponse {
    pub message: String,
    pub coverage: Coverage,
}

/// Live pricing of one active coverage
#[derive(Debug, Serialize)]
pub struct CoveragePricingResponse {
    pub premium: Decimal,
    pub amount: Decimal,
    pub items: Vec<PricedItem>,
    pub coverage_name: String,
}

impl From<(Coverage, Pricing)> for CoveragePricingResponse {
    fn from((coverage, pricing): (Coverage, Pricing)) -> Self {
        Self {
            premium: pricing.premium,
            amount: pricing.amount,
            items: pricing.items,
            coverage_name: coverage.name,
        }
    }
}
