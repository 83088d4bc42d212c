//! Aggregate queries behind the dashboard

use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};

use crate::error::DatabaseError;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct StatTotalsRow {
    pub total_clients: i64,
    pub total_policies: i64,
    pub active_policies: i64,
    pub pending_policies: i64,
    pub expired_policies: i64,
    pub total_users: i64,
    pub total_premiums: Decimal,
    pub total_amounts: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct CoverageCountRow {
    pub coverage_name: String,
    pub count: i64,
    pub total_premiums: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct VehicleCountRow {
    pub vehicle_type: String,
    pub count: i64,
}

#[derive(Debug, Clone)]
pub struct StatsRepository {
    pool: PgPool,
}

impl StatsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn totals(&self) -> Result<StatTotalsRow, DatabaseError> {
        let row = sqlx::query_as::<_, StatTotalsRow>(
            "SELECT \
               (SELECT COUNT(*) FROM clients WHERE is_active) AS total_clients, \
               (SELECT COUNT(*) FROM policies) AS total_policies, \
               (SELECT COUNT(*) FROM policies WHERE status = 'activa') AS active_policies, \
               (SELECT COUNT(*) FROM policies WHERE status = 'pendiente') AS pending_policies, \
               (SELECT COUNT(*) FROM policies WHERE status = 'vencida') AS expired_policies, \
               (SELECT COUNT(*) FROM users WHERE is_active) AS total_users, \
               (SELECT COALESCE(SUM(premium), 0) FROM policies WHERE status = 'activa') \
                 AS total_premiums, \
               (SELECT COALESCE(SUM(amount), 0) FROM policies WHERE status = 'activa') \
                 AS total_amounts",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Active policies grouped by coverage name
    pub async fn by_coverage(&self) -> Result<Vec<CoverageCountRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, CoverageCountRow>(
            "SELECT coverage_name, COUNT(*) AS count, COALESCE(SUM(premium), 0) AS total_premiums \
             FROM policies WHERE status = 'activa' \
             GROUP BY coverage_name ORDER BY coverage_name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Active policies grouped by vehicle type
    pub async fn by_vehicle(&self) -> Result<Vec<VehicleCountRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, VehicleCountRow>(
            "SELECT vehicle_type, COUNT(*) AS count \
             FROM policies WHERE status = 'activa' \
             GROUP BY vehicle_type ORDER BY vehicle_type",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
