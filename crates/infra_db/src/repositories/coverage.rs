//! Coverage repository
//!
//! The ten itemised slots live in a single JSONB column.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use domain_policy::CoverageSlot;

use crate::error::DatabaseError;

const COVERAGE_COLUMNS: &str =
    "id, name, description, premium, slots, is_active, created_at, updated_at";

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct CoverageRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub premium: Decimal,
    pub slots: Json<Vec<CoverageSlot>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CoverageRepository {
    pool: PgPool,
}

impl CoverageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<CoverageRow, DatabaseError> {
        sqlx::query_as::<_, CoverageRow>(&format!(
            "SELECT {COVERAGE_COLUMNS} FROM coverages WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Coverage", id))
    }

    /// Exact, case-sensitive name lookup, optionally restricted to active rows
    pub async fn find_by_name(
        &self,
        name: &str,
        active_only: bool,
    ) -> Result<Option<CoverageRow>, DatabaseError> {
        let row = sqlx::query_as::<_, CoverageRow>(&format!(
            "SELECT {COVERAGE_COLUMNS} FROM coverages WHERE name = $1 AND (is_active OR NOT $2)"
        ))
        .bind(name)
        .bind(active_only)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list(&self, include_inactive: bool) -> Result<Vec<CoverageRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, CoverageRow>(&format!(
            "SELECT {COVERAGE_COLUMNS} FROM coverages WHERE is_active OR $1 ORDER BY name"
        ))
        .bind(include_inactive)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn insert(&self, row: &CoverageRow) -> Result<CoverageRow, DatabaseError> {
        let inserted = sqlx::query_as::<_, CoverageRow>(&format!(
            "INSERT INTO coverages ({COVERAGE_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COVERAGE_COLUMNS}"
        ))
        .bind(row.id)
        .bind(&row.name)
        .bind(&row.description)
        .bind(row.premium)
        .bind(&row.slots)
        .bind(row.is_active)
        .bind(row.created_at)
        .bind(row.updated_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(inserted)
    }

    pub async fn update(&self, row: &CoverageRow) -> Result<CoverageRow, DatabaseError> {
        sqlx::query_as::<_, CoverageRow>(&format!(
            "UPDATE coverages SET name = $2, description = $3, premium = $4, slots = $5, \
             is_active = $6, updated_at = $7 WHERE id = $1 RETURNING {COVERAGE_COLUMNS}"
        ))
        .bind(row.id)
        .bind(&row.name)
        .bind(&row.description)
        .bind(row.premium)
        .bind(&row.slots)
        .bind(row.is_active)
        .bind(row.updated_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Coverage", row.id))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM coverages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Coverage", id));
        }
        Ok(())
    }
}
