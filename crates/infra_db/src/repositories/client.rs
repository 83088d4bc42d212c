//! Client repository
//!
//! Plain SQL over the `clients` table. Listing covers active clients only and
//! orders newest first; the search term is matched case-insensitively against
//! cédula, names, email and phone.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::DatabaseError;

const CLIENT_COLUMNS: &str = "id, cedula, first_name, last_name, phone, email, address, city, \
                              region, birth_date, is_active, created_at, updated_at";

const SEARCH_FILTER: &str = "is_active AND ($1::text IS NULL OR cedula ILIKE $1 \
                             OR first_name ILIKE $1 OR last_name ILIKE $1 \
                             OR email ILIKE $1 OR phone ILIKE $1)";

/// Database row of the `clients` table
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ClientRow {
    pub id: Uuid,
    pub cedula: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ClientRepository {
    pool: PgPool,
}

impl ClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<ClientRow, DatabaseError> {
        sqlx::query_as::<_, ClientRow>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Client", id))
    }

    pub async fn find_by_cedula(&self, cedula: &str) -> Result<Option<ClientRow>, DatabaseError> {
        let row = sqlx::query_as::<_, ClientRow>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE cedula = $1"
        ))
        .bind(cedula)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// One page of active clients plus the total number of matches
    pub async fn search(
        &self,
        term: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<ClientRow>, i64), DatabaseError> {
        let pattern = term.map(super::contains_pattern);

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM clients WHERE {SEARCH_FILTER}"))
                .bind(pattern.as_deref())
                .fetch_one(&self.pool)
                .await?;

        let rows = sqlx::query_as::<_, ClientRow>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE {SEARCH_FILTER} \
             ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3"
        ))
        .bind(pattern.as_deref())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((rows, total))
    }

    /// Most recently registered active clients
    pub async fn recent(&self, limit: i64) -> Result<Vec<ClientRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, ClientRow>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE is_active \
             ORDER BY created_at DESC, id DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn count_active(&self) -> Result<i64, DatabaseError> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM clients WHERE is_active")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn insert(&self, row: &ClientRow) -> Result<ClientRow, DatabaseError> {
        let inserted = sqlx::query_as::<_, ClientRow>(&format!(
            "INSERT INTO clients ({CLIENT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             RETURNING {CLIENT_COLUMNS}"
        ))
        .bind(row.id)
        .bind(&row.cedula)
        .bind(&row.first_name)
        .bind(&row.last_name)
        .bind(&row.phone)
        .bind(&row.email)
        .bind(&row.address)
        .bind(&row.city)
        .bind(&row.region)
        .bind(row.birth_date)
        .bind(row.is_active)
        .bind(row.created_at)
        .bind(row.updated_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(inserted)
    }

    pub async fn update(&self, row: &ClientRow) -> Result<ClientRow, DatabaseError> {
        sqlx::query_as::<_, ClientRow>(&format!(
            "UPDATE clients SET cedula = $2, first_name = $3, last_name = $4, phone = $5, \
             email = $6, address = $7, city = $8, region = $9, birth_date = $10, \
             is_active = $11, updated_at = $12 \
             WHERE id = $1 RETURNING {CLIENT_COLUMNS}"
        ))
        .bind(row.id)
        .bind(&row.cedula)
        .bind(&row.first_name)
        .bind(&row.last_name)
        .bind(&row.phone)
        .bind(&row.email)
        .bind(&row.address)
        .bind(&row.city)
        .bind(&row.region)
        .bind(row.birth_date)
        .bind(row.is_active)
        .bind(row.updated_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Client", row.id))
    }

    /// Removes a client; a remaining policy reference fails with a foreign-key violation
    pub async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Client", id));
        }
        Ok(())
    }
}
