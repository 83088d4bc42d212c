//! PostgreSQL Dashboard Adapter

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use core_kernel::{DomainPort, PortError};
use domain_policy::stats::RECENT_LIMIT;
use domain_policy::{
    CoverageBreakdown, DashboardStats, StatTotals, StatsPort, VehicleBreakdown, VehicleType,
};

use crate::error::DatabaseError;
use crate::repositories::client::ClientRepository;
use crate::repositories::policy::PolicyRepository;
use crate::repositories::stats::{StatTotalsRow, StatsRepository, VehicleCountRow};

use super::client::row_to_client;
use super::policy::joined_to_domain;

#[derive(Debug, Clone)]
pub struct PostgresStatsAdapter {
    stats: StatsRepository,
    clients: ClientRepository,
    policies: PolicyRepository,
}

impl PostgresStatsAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            stats: StatsRepository::new(pool.clone()),
            clients: ClientRepository::new(pool.clone()),
            policies: PolicyRepository::new(pool),
        }
    }
}

impl DomainPort for PostgresStatsAdapter {}

#[async_trait]
impl StatsPort for PostgresStatsAdapter {
    #[instrument(skip(self))]
    async fn dashboard(&self) -> Result<DashboardStats, PortError> {
        let limit = RECENT_LIMIT as i64;

        let totals = self.stats.totals().await?;
        let recent_clients = self.clients.recent(limit).await?;
        let recent_policies = self
            .policies
            .recent(limit)
            .await?
            .into_iter()
            .map(joined_to_domain)
            .collect::<Result<Vec<_>, _>>()?;
        let by_coverage = self
            .stats
            .by_coverage()
            .await?
            .into_iter()
            .map(|row| CoverageBreakdown {
                coverage_name: row.coverage_name,
                count: row.count.max(0) as u64,
                total_premiums: row.total_premiums,
            })
            .collect();
        let by_vehicle = self
            .stats
            .by_vehicle()
            .await?
            .into_iter()
            .map(vehicle_breakdown)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DashboardStats {
            stats: totals_to_domain(totals),
            recent_clients: recent_clients.into_iter().map(row_to_client).collect(),
            recent_policies,
            by_coverage,
            by_vehicle,
        })
    }
}

fn totals_to_domain(row: StatTotalsRow) -> StatTotals {
    let count = |value: i64| value.max(0) as u64;
    StatTotals {
        total_clients: count(row.total_clients),
        total_policies: count(row.total_policies),
        active_policies: count(row.active_policies),
        pending_policies: count(row.pending_policies),
        expired_policies: count(row.expired_policies),
        total_users: count(row.total_users),
        total_premiums: row.total_premiums,
        total_amounts: row.total_amounts,
    }
}

fn vehicle_breakdown(row: VehicleCountRow) -> Result<VehicleBreakdown, DatabaseError> {
    let vehicle_type: VehicleType = row
        .vehicle_type
        .parse()
        .map_err(|e| DatabaseError::serialization(format!("{e}")))?;
    Ok(VehicleBreakdown {
        vehicle_type,
        count: row.count.max(0) as u64,
    })
}
