//! Policy repository
//!
//! Besides plain CRUD this owns the `sequences` table: a policy number is
//! drawn and the policy inserted in one transaction, with the counter bumped
//! by a single `UPDATE ... RETURNING` so that concurrent issuers serialize on
//! the counter row.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

use domain_policy::numbering::{format_policy_number, seed_from, POLICY_SEQUENCE};

use crate::error::DatabaseError;

const POLICY_COLUMNS: &str = "id, policy_number, client_id, vehicle_type, plate, brand, model, \
                              year, color, body_serial, engine_serial, coverage_name, amount, \
                              premium, start_date, end_date, status, notes, created_by, \
                              created_at, updated_at";

const JOINED_SELECT: &str = "SELECT p.id, p.policy_number, p.client_id, p.vehicle_type, p.plate, \
                             p.brand, p.model, p.year, p.color, p.body_serial, p.engine_serial, \
                             p.coverage_name, p.amount, p.premium, p.start_date, p.end_date, \
                             p.status, p.notes, p.created_by, p.created_at, p.updated_at, \
                             c.first_name AS client_first_name, \
                             c.last_name AS client_last_name, \
                             c.cedula AS client_cedula, \
                             c.phone AS client_phone, \
                             c.email AS client_email \
                             FROM policies p JOIN clients c ON c.id = p.client_id";

const LIST_FILTER: &str = "($1::text IS NULL OR p.status = $1) \
                           AND ($2::text IS NULL OR p.policy_number ILIKE $2 \
                           OR p.plate ILIKE $2 OR c.first_name ILIKE $2 \
                           OR c.last_name ILIKE $2 OR c.cedula ILIKE $2)";

/// Database row of the `policies` table
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct PolicyRow {
    pub id: Uuid,
    pub policy_number: String,
    pub client_id: Uuid,
    pub vehicle_type: String,
    pub plate: String,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub color: Option<String>,
    pub body_serial: Option<String>,
    pub engine_serial: Option<String>,
    pub coverage_name: String,
    pub amount: Decimal,
    pub premium: Decimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: String,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A policy row joined with its owner's display columns
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct PolicyClientRow {
    #[sqlx(flatten)]
    pub policy: PolicyRow,
    pub client_first_name: String,
    pub client_last_name: String,
    pub client_cedula: String,
    pub client_phone: Option<String>,
    pub client_email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PolicyRepository {
    pool: PgPool,
}

impl PolicyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<PolicyClientRow, DatabaseError> {
        sqlx::query_as::<_, PolicyClientRow>(&format!("{JOINED_SELECT} WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Policy", id))
    }

    /// One page of policies plus the total number of matches, newest first
    pub async fn search(
        &self,
        status: Option<&str>,
        term: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<PolicyClientRow>, i64), DatabaseError> {
        let pattern = term.map(super::contains_pattern);

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM policies p JOIN clients c ON c.id = p.client_id \
             WHERE {LIST_FILTER}"
        ))
        .bind(status)
        .bind(pattern.as_deref())
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, PolicyClientRow>(&format!(
            "{JOINED_SELECT} WHERE {LIST_FILTER} \
             ORDER BY p.created_at DESC, p.id DESC LIMIT $3 OFFSET $4"
        ))
        .bind(status)
        .bind(pattern.as_deref())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((rows, total))
    }

    pub async fn recent(&self, limit: i64) -> Result<Vec<PolicyClientRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, PolicyClientRow>(&format!(
            "{JOINED_SELECT} ORDER BY p.created_at DESC, p.id DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_for_client(&self, client_id: Uuid) -> Result<Vec<PolicyRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, PolicyRow>(&format!(
            "SELECT {POLICY_COLUMNS} FROM policies WHERE client_id = $1 \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Most recent policy whose number ends with `fragment`
    pub async fn find_by_suffix(
        &self,
        fragment: &str,
    ) -> Result<Option<PolicyClientRow>, DatabaseError> {
        let row = sqlx::query_as::<_, PolicyClientRow>(&format!(
            "{JOINED_SELECT} WHERE p.policy_number LIKE $1 \
             ORDER BY p.created_at DESC, p.id DESC LIMIT 1"
        ))
        .bind(super::suffix_pattern(fragment))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn count_for_client(&self, client_id: Uuid) -> Result<i64, DatabaseError> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM policies WHERE client_id = $1")
            .bind(client_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn count_by_coverage(&self, coverage_name: &str) -> Result<i64, DatabaseError> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM policies WHERE coverage_name = $1")
            .bind(coverage_name)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Draws the next policy number and inserts `row` under it, atomically
    ///
    /// The `policy_number` of `row` is ignored.
    pub async fn insert_numbered(&self, row: &PolicyRow) -> Result<PolicyRow, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let value = next_sequence_value(&mut tx).await?;
        let number = format_policy_number(value);
        debug!(policy_number = %number, "Allocated policy number");

        let inserted = sqlx::query_as::<_, PolicyRow>(&format!(
            "INSERT INTO policies ({POLICY_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
             $17, $18, $19, $20, $21) \
             RETURNING {POLICY_COLUMNS}"
        ))
        .bind(row.id)
        .bind(&number)
        .bind(row.client_id)
        .bind(&row.vehicle_type)
        .bind(&row.plate)
        .bind(&row.brand)
        .bind(&row.model)
        .bind(row.year)
        .bind(&row.color)
        .bind(&row.body_serial)
        .bind(&row.engine_serial)
        .bind(&row.coverage_name)
        .bind(row.amount)
        .bind(row.premium)
        .bind(row.start_date)
        .bind(row.end_date)
        .bind(&row.status)
        .bind(&row.notes)
        .bind(row.created_by)
        .bind(row.created_at)
        .bind(row.updated_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(inserted)
    }

    /// Persists the fields a policy may change after issuance
    pub async fn update(&self, row: &PolicyRow) -> Result<PolicyRow, DatabaseError> {
        sqlx::query_as::<_, PolicyRow>(&format!(
            "UPDATE policies SET coverage_name = $2, amount = $3, premium = $4, \
             start_date = $5, end_date = $6, status = $7, notes = $8, updated_at = $9 \
             WHERE id = $1 RETURNING {POLICY_COLUMNS}"
        ))
        .bind(row.id)
        .bind(&row.coverage_name)
        .bind(row.amount)
        .bind(row.premium)
        .bind(row.start_date)
        .bind(row.end_date)
        .bind(&row.status)
        .bind(&row.notes)
        .bind(row.updated_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Policy", row.id))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM policies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Policy", id));
        }
        Ok(())
    }
}

/// Seeds the policy counter if needed and bumps it by one
async fn next_sequence_value(tx: &mut Transaction<'_, Postgres>) -> Result<u64, DatabaseError> {
    let exists: Option<i64> = sqlx::query_scalar("SELECT value FROM sequences WHERE name = $1")
        .bind(POLICY_SEQUENCE)
        .fetch_optional(&mut **tx)
        .await?;

    if exists.is_none() {
        let numbers: Vec<String> = sqlx::query_scalar("SELECT policy_number FROM policies")
            .fetch_all(&mut **tx)
            .await?;
        let seed = seed_from(numbers.iter().map(String::as_str));
        let seed = i64::try_from(seed)
            .map_err(|_| DatabaseError::serialization(format!("sequence seed {seed} overflows")))?;

        sqlx::query(
            "INSERT INTO sequences (name, value) VALUES ($1, $2) ON CONFLICT (name) DO NOTHING",
        )
        .bind(POLICY_SEQUENCE)
        .bind(seed)
        .execute(&mut **tx)
        .await?;
    }

    let value: i64 =
        sqlx::query_scalar("UPDATE sequences SET value = value + 1 WHERE name = $1 RETURNING value")
            .bind(POLICY_SEQUENCE)
            .fetch_one(&mut **tx)
            .await?;

    u64::try_from(value)
        .map_err(|_| DatabaseError::serialization(format!("negative sequence value {value}")))
}
