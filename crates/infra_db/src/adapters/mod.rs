//! Port adapters backed by PostgreSQL
//!
//! Each adapter implements one domain port on top of its repository,
//! translating rows to domain models and `DatabaseError` to `PortError`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresClientAdapter;
//! use domain_party::ClientPort;
//! use std::sync::Arc;
//!
//! let port: Arc<dyn ClientPort> = Arc::new(PostgresClientAdapter::new(pool));
//! let client = port.get_client(client_id).await?;
//! ```

pub mod client;
pub mod policy;
pub mod coverage;
pub mod user;
pub mod stats;

pub use client::PostgresClientAdapter;
pub use policy::PostgresPolicyAdapter;
pub use coverage::PostgresCoverageAdapter;
pub use user::PostgresUserAdapter;
pub use stats::PostgresStatsAdapter;

use chrono::Utc;
use sqlx::PgPool;

use core_kernel::{AdapterHealth, HealthCheckResult};

/// Runs `SELECT 1` and reports the round trip
pub(crate) async fn probe(pool: &PgPool, adapter_id: &str) -> HealthCheckResult {
    let start = std::time::Instant::now();

    let result = sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool).await;

    let latency_ms = start.elapsed().as_millis() as u64;

    let (status, message) = match result {
        Ok(_) => (AdapterHealth::Healthy, None),
        Err(e) => (AdapterHealth::Unhealthy, Some(format!("Database error: {e}"))),
    };
    HealthCheckResult {
        adapter_id: adapter_id.to_string(),
        status,
        latency_ms,
        message,
        checked_at: Utc::now(),
    }
}
