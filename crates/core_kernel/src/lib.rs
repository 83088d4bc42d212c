//! Core Kernel - Foundational types shared by every crate of the RCV backend
//!
//! This crate provides the building blocks used across the domain modules:
//! - Strongly-typed identifiers for clients, policies, coverages and users
//! - Calendar helpers (agency timezone, validity windows, yearly terms)
//! - Port error type and marker traits for the hexagonal architecture

pub mod temporal;
pub mod identifiers;
pub mod error;
pub mod ports;

pub use temporal::{Timezone, ValidityPeriod, TemporalError, add_years};
pub use identifiers::{ClientId, PolicyId, CoverageId, UserId};
pub use error::CoreError;
pub use ports::{
    PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth,
    Page, PageRequest,
};
