//! Test Utilities Crate
//!
//! Shared test infrastructure for the RCV backend test suite.
//!
//! # Modules
//!
//! - `fixtures`: Fixed sample data (the "Básica" coverage, a known client, users)
//! - `builders`: Builders with randomised defaults for clients, policies and users
//! - `database`: PostgreSQL test containers with the migrated schema
//! - `assertions`: Assertion helpers for policy numbers and validity terms
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
