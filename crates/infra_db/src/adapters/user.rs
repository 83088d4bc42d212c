//! PostgreSQL User Adapter

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, PortError, UserId};
use domain_access::{Role, User, UserPort};

use crate::error::DatabaseError;
use crate::repositories::user::{UserRepository, UserRow};

#[derive(Debug, Clone)]
pub struct PostgresUserAdapter {
    repository: UserRepository,
    pool: PgPool,
}

impl PostgresUserAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: UserRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresUserAdapter {}

#[async_trait]
impl HealthCheckable for PostgresUserAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::probe(&self.pool, "postgres-user-adapter").await
    }
}

#[async_trait]
impl UserPort for PostgresUserAdapter {
    #[instrument(skip(self), fields(user_id = %id))]
    async fn get_user(&self, id: UserId) -> Result<User, PortError> {
        let row = self.repository.get_by_id(id.into()).await?;
        Ok(row_to_user(row)?)
    }

    #[instrument(skip(self))]
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, PortError> {
        let row = self.repository.find_by_username(username).await?;
        Ok(row.map(row_to_user).transpose()?)
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, PortError> {
        let row = self.repository.find_by_email(email).await?;
        Ok(row.map(row_to_user).transpose()?)
    }

    #[instrument(skip(self))]
    async fn list_users(&self) -> Result<Vec<User>, PortError> {
        let rows = self.repository.list().await?;
        let users = rows
            .into_iter()
            .map(row_to_user)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    #[instrument(skip(self))]
    async fn count_users(&self) -> Result<u64, PortError> {
        let count = self.repository.count(false).await?;
        Ok(count.max(0) as u64)
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn create_user(&self, user: User) -> Result<User, PortError> {
        let row = self.repository.insert(&user_to_row(&user)).await?;
        Ok(row_to_user(row)?)
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn update_user(&self, user: User) -> Result<User, PortError> {
        let row = self.repository.update(&user_to_row(&user)).await?;
        Ok(row_to_user(row)?)
    }

    #[instrument(skip(self), fields(user_id = %id))]
    async fn delete_user(&self, id: UserId) -> Result<(), PortError> {
        self.repository.delete(id.into()).await?;
        Ok(())
    }
}

fn row_to_user(row: UserRow) -> Result<User, DatabaseError> {
    let role: Role = row
        .role
        .parse()
        .map_err(|e| DatabaseError::serialization(format!("user {}: {e}", row.id)))?;
    Ok(User {
        id: UserId::from(row.id),
        username: row.username,
        email: row.email,
        password_hash: row.password_hash,
        role,
        is_active: row.is_active,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn user_to_row(user: &User) -> UserRow {
    UserRow {
        id: user.id.into(),
        username: user.username.clone(),
        email: user.email.clone(),
        password_hash: user.password_hash.clone(),
        role: user.role.as_str().to_string(),
        is_active: user.is_active,
        created_at: user.created_at,
        updated_at: user.updated_at,
    }
}
