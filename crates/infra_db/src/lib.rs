//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for the RCV backend using SQLx.
//!
//! # Architecture
//!
//! - [`pool`]: connection pool and embedded migrations
//! - [`repositories`]: one repository per table, speaking in row types
//! - [`adapters`]: domain port implementations over the repositories
//! - [`error`]: SQLSTATE-aware error mapping to `PortError`
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig};
//! use infra_db::adapters::PostgresPolicyAdapter;
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/rcv")).await?;
//! run_migrations(&pool).await?;
//! let policies = PostgresPolicyAdapter::new(pool.clone());
//! ```

pub mod pool;
pub mod error;
pub mod repositories;
pub mod adapters;

pub use pool::{DatabasePool, DatabaseConfig, create_pool, run_migrations};
pub use error::DatabaseError;
