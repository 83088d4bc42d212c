//! Coverage pricing resolver
//!
//! Turns a coverage name into the premium and insured amount a policy is
//! issued with. An unknown or inactive coverage prices to zero rather than
//! failing; callers decide what a zero means for them.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use core_kernel::PortError;

use crate::coverage::Coverage;
use crate::ports::CoveragePort;

/// A named slot as shown to users
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedItem {
    pub name: String,
    pub amount: Decimal,
}

/// Premium and insured amount for one coverage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pricing {
    pub premium: Decimal,
    /// Sum of the named slot amounts
    pub amount: Decimal,
    pub items: Vec<PricedItem>,
}

impl Pricing {
    pub fn zero() -> Self {
        Self {
            premium: Decimal::ZERO,
            amount: Decimal::ZERO,
            items: Vec::new(),
        }
    }

    /// Prices a coverage regardless of its active flag
    pub fn of(coverage: &Coverage) -> Self {
        let items: Vec<PricedItem> = coverage
            .named_slots()
            .filter_map(|slot| {
                slot.label().map(|name| PricedItem {
                    name: name.to_string(),
                    amount: slot.amount_or_zero(),
                })
            })
            .collect();
        Self {
            premium: coverage.premium,
            amount: items.iter().map(|item| item.amount).sum(),
            items,
        }
    }

    /// Prices an optional coverage; absent or inactive yields zero
    pub fn resolve(coverage: Option<&Coverage>) -> Self {
        match coverage {
            Some(coverage) if coverage.is_active => Self::of(coverage),
            _ => Self::zero(),
        }
    }
}

/// Pricing entry of the catalog view, keyed by coverage name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoveragePricing {
    pub premium: Decimal,
    pub amount: Decimal,
    pub description: Option<String>,
    pub items: Vec<PricedItem>,
}

impl From<&Coverage> for CoveragePricing {
    fn from(coverage: &Coverage) -> Self {
        let pricing = Pricing::of(coverage);
        Self {
            premium: pricing.premium,
            amount: pricing.amount,
            description: coverage.description.clone(),
            items: pricing.items,
        }
    }
}

/// Resolves coverage names against the catalog
#[derive(Clone)]
pub struct PricingResolver {
    coverages: Arc<dyn CoveragePort>,
}

impl PricingResolver {
    pub fn new(coverages: Arc<dyn CoveragePort>) -> Self {
        Self { coverages }
    }

    /// Looks up the active coverage with exactly this name and prices it
    pub async fn resolve(&self, coverage_name: &str) -> Result<Pricing, PortError> {
        let coverage = self.coverages.find_active_by_name(coverage_name).await?;
        if coverage.is_none() {
            debug!(coverage = coverage_name, "No active coverage, pricing at zero");
        }
        Ok(Pricing::resolve(coverage.as_ref()))
    }
}
