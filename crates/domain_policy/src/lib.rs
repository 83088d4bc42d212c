//! Vehicle Policy Domain
//!
//! This crate implements the agency's motor liability policies (RCV): policy
//! issuance with sequential numbering, coverage catalogs and their pricing,
//! renewals, and the figures shown on the dashboard.
//!
//! # Architecture
//!
//! - **Entities**: `Policy`, `Coverage`
//! - **Value Objects**: `Vehicle`, `CoverageSlot`, `Pricing`
//! - **Ports**: `PolicyPort`, `CoveragePort`, `StatsPort`
//! - **Services**: `PolicyService`, `CoverageService`, `PricingResolver`
//!
//! # Policy Status
//!
//! ```text
//! {pendiente, activa} -> activa (issue / renew)
//! activa -> {vencida, cancelada} (manual update)
//! any -> activa (renew)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_policy::{PolicyService, NewPolicy};
//!
//! let service = PolicyService::new(policies, coverages, clients);
//! let policy = service.create(new_policy, current_user).await?;
//! assert_eq!(policy.policy_number.len(), 8);
//! ```

pub mod policy;
pub mod coverage;
pub mod numbering;
pub mod pricing;
pub mod stats;
pub mod error;
pub mod ports;
pub mod services;

pub use policy::{
    Policy, PolicyStatus, Vehicle, VehicleType, NewPolicy, PolicyUpdate, PolicyQuery,
    PolicyWithClient, PolicyVerification, PendingPolicy,
};
pub use coverage::{Coverage, CoverageSlot, NewCoverage, CoverageUpdate, COVERAGE_SLOTS};
pub use numbering::{PolicySequence, format_policy_number, numeric_suffix, POLICY_SEQUENCE};
pub use pricing::{Pricing, PricedItem, CoveragePricing, PricingResolver};
pub use stats::{DashboardStats, StatTotals, CoverageBreakdown, VehicleBreakdown};
pub use error::PolicyError;
pub use ports::{PolicyPort, CoveragePort, StatsPort};
pub use services::{PolicyService, CoverageService};
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::{MockPolicyPort, MockCoveragePort, MockStatsPort};
