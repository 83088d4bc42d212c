//! PostgreSQL Policy Adapter
//!
//! Implements [`PolicyPort`] and, for the client-deletion guard,
//! [`PolicyReferences`]. Policy numbers are allocated inside the insert
//! transaction by [`PolicyRepository::insert_numbered`].

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, info, instrument};

use core_kernel::{
    ClientId, DomainPort, HealthCheckResult, HealthCheckable, Page, PolicyId, PortError, UserId,
};
use domain_party::PolicyReferences;
use domain_policy::{
    PendingPolicy, Policy, PolicyPort, PolicyQuery, PolicyStatus, PolicyWithClient, Vehicle,
    VehicleType,
};

use crate::error::DatabaseError;
use crate::repositories::policy::{PolicyClientRow, PolicyRepository, PolicyRow};

use super::client::page_offset;

#[derive(Debug, Clone)]
pub struct PostgresPolicyAdapter {
    repository: PolicyRepository,
    pool: PgPool,
}

impl PostgresPolicyAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: PolicyRepository::new(pool.clone()),
            pool,
        }
    }

    pub fn repository(&self) -> &PolicyRepository {
        &self.repository
    }
}

impl DomainPort for PostgresPolicyAdapter {}

#[async_trait]
impl HealthCheckable for PostgresPolicyAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::probe(&self.pool, "postgres-policy-adapter").await
    }
}

#[async_trait]
impl PolicyPort for PostgresPolicyAdapter {
    #[instrument(skip(self), fields(policy_id = %id))]
    async fn get_policy(&self, id: PolicyId) -> Result<PolicyWithClient, PortError> {
        let row = self.repository.get_by_id(id.into()).await?;
        Ok(joined_to_domain(row)?)
    }

    #[instrument(skip(self, query), fields(status = ?query.status, page = query.page.page))]
    async fn list_policies(&self, query: PolicyQuery) -> Result<Page<PolicyWithClient>, PortError> {
        let (rows, total) = self
            .repository
            .search(
                query.status.as_ref().map(PolicyStatus::as_str),
                query.search.as_deref(),
                i64::from(query.page.limit),
                page_offset(query.page.offset())?,
            )
            .await?;
        debug!(total, "Listed policies");

        let items = rows
            .into_iter()
            .map(joined_to_domain)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, total.max(0) as u64, query.page))
    }

    #[instrument(skip(self), fields(client_id = %client_id))]
    async fn list_for_client(&self, client_id: ClientId) -> Result<Vec<Policy>, PortError> {
        let rows = self.repository.list_for_client(client_id.into()).await?;
        let policies = rows
            .into_iter()
            .map(row_to_policy)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(policies)
    }

    #[instrument(skip(self, pending), fields(policy_id = %pending.id, client_id = %pending.client_id))]
    async fn issue_policy(&self, pending: PendingPolicy) -> Result<Policy, PortError> {
        let draft = Policy::issue(pending, String::new());
        let row = self
            .repository
            .insert_numbered(&policy_to_row(&draft))
            .await?;
        let policy = row_to_policy(row)?;
        info!(policy_number = %policy.policy_number, "Policy row inserted");
        Ok(policy)
    }

    #[instrument(skip(self, policy), fields(policy_id = %policy.id))]
    async fn update_policy(&self, policy: Policy) -> Result<Policy, PortError> {
        let row = self.repository.update(&policy_to_row(&policy)).await?;
        Ok(row_to_policy(row)?)
    }

    #[instrument(skip(self), fields(policy_id = %id))]
    async fn delete_policy(&self, id: PolicyId) -> Result<(), PortError> {
        self.repository.delete(id.into()).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn count_by_coverage(&self, name: &str) -> Result<u64, PortError> {
        let count = self.repository.count_by_coverage(name).await?;
        Ok(count.max(0) as u64)
    }

    #[instrument(skip(self))]
    async fn find_by_number_suffix(
        &self,
        fragment: &str,
    ) -> Result<Option<PolicyWithClient>, PortError> {
        let row = self.repository.find_by_suffix(fragment).await?;
        Ok(row.map(joined_to_domain).transpose()?)
    }
}

#[async_trait]
impl PolicyReferences for PostgresPolicyAdapter {
    #[instrument(skip(self), fields(client_id = %id))]
    async fn count_policies_for_client(&self, id: ClientId) -> Result<u64, PortError> {
        let count = self.repository.count_for_client(id.into()).await?;
        Ok(count.max(0) as u64)
    }
}

pub(crate) fn row_to_policy(row: PolicyRow) -> Result<Policy, DatabaseError> {
    let vehicle_type: VehicleType = row
        .vehicle_type
        .parse()
        .map_err(|e| DatabaseError::serialization(format!("policy {}: {e}", row.id)))?;
    let status: PolicyStatus = row
        .status
        .parse()
        .map_err(|e| DatabaseError::serialization(format!("policy {}: {e}", row.id)))?;

    Ok(Policy {
        id: PolicyId::from(row.id),
        policy_number: row.policy_number,
        client_id: ClientId::from(row.client_id),
        vehicle: Vehicle {
            vehicle_type,
            plate: row.plate,
            brand: row.brand,
            model: row.model,
            year: row.year,
            color: row.color,
            body_serial: row.body_serial,
            engine_serial: row.engine_serial,
        },
        coverage_name: row.coverage_name,
        amount: row.amount,
        premium: row.premium,
        start_date: row.start_date,
        end_date: row.end_date,
        status,
        notes: row.notes,
        created_by: row.created_by.map(UserId::from),
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

pub(crate) fn joined_to_domain(row: PolicyClientRow) -> Result<PolicyWithClient, DatabaseError> {
    Ok(PolicyWithClient {
        policy: row_to_policy(row.policy)?,
        client_name: format!("{} {}", row.client_first_name, row.client_last_name),
        client_first_name: row.client_first_name,
        client_last_name: row.client_last_name,
        client_cedula: row.client_cedula,
        client_phone: row.client_phone,
        client_email: row.client_email,
    })
}

fn policy_to_row(policy: &Policy) -> PolicyRow {
    PolicyRow {
        id: policy.id.into(),
        policy_number: policy.policy_number.clone(),
        client_id: policy.client_id.into(),
        vehicle_type: policy.vehicle.vehicle_type.as_str().to_string(),
        plate: policy.vehicle.plate.clone(),
        brand: policy.vehicle.brand.clone(),
        model: policy.vehicle.model.clone(),
        year: policy.vehicle.year,
        color: policy.vehicle.color.clone(),
        body_serial: policy.vehicle.body_serial.clone(),
        engine_serial: policy.vehicle.engine_serial.clone(),
        coverage_name: policy.coverage_name.clone(),
        amount: policy.amount,
        premium: policy.premium,
        start_date: policy.start_date,
        end_date: policy.end_date,
        status: policy.status.as_str().to_string(),
        notes: policy.notes.clone(),
        created_by: policy.created_by.map(Into::into),
        created_at: policy.created_at,
        updated_at: policy.updated_at,
    }
}
