//! PostgreSQL Client Adapter

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{ClientId, DomainPort, HealthCheckResult, HealthCheckable, Page, PortError};
use domain_party::{Client, ClientPort, ClientQuery};

use crate::repositories::client::{ClientRepository, ClientRow};

/// PostgreSQL-backed implementation of [`ClientPort`]
///
/// Uniqueness of the cédula is enforced by the table's UNIQUE constraint; a
/// violation surfaces as `PortError::Conflict`.
#[derive(Debug, Clone)]
pub struct PostgresClientAdapter {
    repository: ClientRepository,
    pool: PgPool,
}

impl PostgresClientAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: ClientRepository::new(pool.clone()),
            pool,
        }
    }

    pub fn repository(&self) -> &ClientRepository {
        &self.repository
    }
}

impl DomainPort for PostgresClientAdapter {}

#[async_trait]
impl HealthCheckable for PostgresClientAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::probe(&self.pool, "postgres-client-adapter").await
    }
}

#[async_trait]
impl ClientPort for PostgresClientAdapter {
    #[instrument(skip(self), fields(client_id = %id))]
    async fn get_client(&self, id: ClientId) -> Result<Client, PortError> {
        let row = self.repository.get_by_id(id.into()).await?;
        Ok(row_to_client(row))
    }

    #[instrument(skip(self))]
    async fn find_by_cedula(&self, cedula: &str) -> Result<Option<Client>, PortError> {
        let row = self.repository.find_by_cedula(cedula).await?;
        Ok(row.map(row_to_client))
    }

    #[instrument(skip(self), fields(page = query.page.page, limit = query.page.limit))]
    async fn list_clients(&self, query: ClientQuery) -> Result<Page<Client>, PortError> {
        let (rows, total) = self
            .repository
            .search(
                query.search.as_deref(),
                i64::from(query.page.limit),
                page_offset(query.page.offset())?,
            )
            .await?;
        debug!(total, "Listed clients");

        let items = rows.into_iter().map(row_to_client).collect();
        Ok(Page::new(items, total.max(0) as u64, query.page))
    }

    #[instrument(skip(self, client), fields(client_id = %client.id))]
    async fn create_client(&self, client: Client) -> Result<Client, PortError> {
        let row = self.repository.insert(&client_to_row(&client)).await?;
        Ok(row_to_client(row))
    }

    #[instrument(skip(self, client), fields(client_id = %client.id))]
    async fn update_client(&self, client: Client) -> Result<Client, PortError> {
        let row = self.repository.update(&client_to_row(&client)).await?;
        Ok(row_to_client(row))
    }

    #[instrument(skip(self), fields(client_id = %id))]
    async fn delete_client(&self, id: ClientId) -> Result<(), PortError> {
        self.repository.delete(id.into()).await?;
        Ok(())
    }
}

pub(crate) fn page_offset(offset: u64) -> Result<i64, PortError> {
    i64::try_from(offset).map_err(|_| PortError::validation("page out of range"))
}

pub(crate) fn row_to_client(row: ClientRow) -> Client {
    Client {
        id: ClientId::from(row.id),
        cedula: row.cedula,
        first_name: row.first_name,
        last_name: row.last_name,
        phone: row.phone,
        email: row.email,
        address: row.address,
        city: row.city,
        region: row.region,
        birth_date: row.birth_date,
        is_active: row.is_active,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

fn client_to_row(client: &Client) -> ClientRow {
    ClientRow {
        id: client.id.into(),
        cedula: client.cedula.clone(),
        first_name: client.first_name.clone(),
        last_name: client.last_name.clone(),
        phone: client.phone.clone(),
        email: client.email.clone(),
        address: client.address.clone(),
        city: client.city.clone(),
        region: client.region.clone(),
        birth_date: client.birth_date,
        is_active: client.is_active,
        created_at: client.created_at,
        updated_at: client.updated_at,
    }
}
