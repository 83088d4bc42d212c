//! Dashboard figures

use rust_decimal::Decimal;
use serde::Serialize;

use domain_party::Client;

use crate::policy::{PolicyWithClient, VehicleType};

/// Number of recent clients and policies shown on the dashboard
pub const RECENT_LIMIT: usize = 5;

/// Headline counts and sums
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatTotals {
    /// Active clients
    pub total_clients: u64,
    pub total_policies: u64,
    pub active_policies: u64,
    pub pending_policies: u64,
    pub expired_policies: u64,
    /// Active user accounts
    pub total_users: u64,
    /// Premium sum over active policies
    pub total_premiums: Decimal,
    /// Insured amount sum over active policies
    pub total_amounts: Decimal,
}

/// Active policies grouped by coverage name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverageBreakdown {
    pub coverage_name: String,
    pub count: u64,
    pub total_premiums: Decimal,
}

/// Active policies grouped by vehicle type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VehicleBreakdown {
    pub vehicle_type: VehicleType,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub stats: StatTotals,
    pub recent_clients: Vec<Client>,
    pub recent_policies: Vec<PolicyWithClient>,
    pub by_coverage: Vec<CoverageBreakdown>,
    pub by_vehicle: Vec<VehicleBreakdown>,
}
