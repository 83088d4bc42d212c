//! PostgreSQL Coverage Adapter

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::instrument;

use core_kernel::{CoverageId, DomainPort, HealthCheckResult, HealthCheckable, PortError};
use domain_policy::{Coverage, CoveragePort, CoverageSlot, COVERAGE_SLOTS};

use crate::repositories::coverage::{CoverageRepository, CoverageRow};

#[derive(Debug, Clone)]
pub struct PostgresCoverageAdapter {
    repository: CoverageRepository,
    pool: PgPool,
}

impl PostgresCoverageAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: CoverageRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresCoverageAdapter {}

#[async_trait]
impl HealthCheckable for PostgresCoverageAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::probe(&self.pool, "postgres-coverage-adapter").await
    }
}

#[async_trait]
impl CoveragePort for PostgresCoverageAdapter {
    #[instrument(skip(self), fields(coverage_id = %id))]
    async fn get_coverage(&self, id: CoverageId) -> Result<Coverage, PortError> {
        let row = self.repository.get_by_id(id.into()).await?;
        Ok(row_to_coverage(row))
    }

    #[instrument(skip(self))]
    async fn find_by_name(&self, name: &str) -> Result<Option<Coverage>, PortError> {
        let row = self.repository.find_by_name(name, false).await?;
        Ok(row.map(row_to_coverage))
    }

    #[instrument(skip(self))]
    async fn find_active_by_name(&self, name: &str) -> Result<Option<Coverage>, PortError> {
        let row = self.repository.find_by_name(name, true).await?;
        Ok(row.map(row_to_coverage))
    }

    #[instrument(skip(self))]
    async fn list_coverages(&self, include_inactive: bool) -> Result<Vec<Coverage>, PortError> {
        let rows = self.repository.list(include_inactive).await?;
        Ok(rows.into_iter().map(row_to_coverage).collect())
    }

    #[instrument(skip(self, coverage), fields(name = %coverage.name))]
    async fn create_coverage(&self, coverage: Coverage) -> Result<Coverage, PortError> {
        let row = self.repository.insert(&coverage_to_row(&coverage)).await?;
        Ok(row_to_coverage(row))
    }

    #[instrument(skip(self, coverage), fields(coverage_id = %coverage.id))]
    async fn update_coverage(&self, coverage: Coverage) -> Result<Coverage, PortError> {
        let row = self.repository.update(&coverage_to_row(&coverage)).await?;
        Ok(row_to_coverage(row))
    }

    #[instrument(skip(self), fields(coverage_id = %id))]
    async fn delete_coverage(&self, id: CoverageId) -> Result<(), PortError> {
        self.repository.delete(id.into()).await?;
        Ok(())
    }
}

/// Stored slot arrays shorter than ten are padded with empty slots
fn row_to_coverage(row: CoverageRow) -> Coverage {
    let stored = row.slots.0;
    let slots: [CoverageSlot; COVERAGE_SLOTS] =
        std::array::from_fn(|i| stored.get(i).cloned().unwrap_or_default());
    Coverage {
        id: CoverageId::from(row.id),
        name: row.name,
        description: row.description,
        premium: row.premium,
        slots,
        is_active: row.is_active,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

fn coverage_to_row(coverage: &Coverage) -> CoverageRow {
    CoverageRow {
        id: coverage.id.into(),
        name: coverage.name.clone(),
        description: coverage.description.clone(),
        premium: coverage.premium,
        slots: Json(coverage.slots.to_vec()),
        is_active: coverage.is_active,
        created_at: coverage.created_at,
        updated_at: coverage.updated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    #[test]
    fn test_short_slot_arrays_are_padded() {
        let now = Utc::now();
        let row = CoverageRow {
            id: uuid::Uuid::now_v7(),
            name: "Básica".into(),
            description: None,
            premium: dec!(35),
            slots: Json(vec![CoverageSlot::new("Daño", dec!(500))]),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let coverage = row_to_coverage(row);
        assert_eq!(coverage.slots[0].label(), Some("Daño"));
        assert!(coverage.slots[1..].iter().all(|slot| slot.label().is_none()));
        assert_eq!(coverage_to_row(&coverage).slots.0.len(), COVERAGE_SLOTS);
    }
}
