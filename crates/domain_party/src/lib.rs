//! Client Management Domain
//!
//! This crate manages the agency's clients (policyholders): their identity
//! document (cédula), names and contact data.
//!
//! # Lifecycle
//!
//! ```text
//! created (active) -> updated* -> deactivated | deleted
//! ```
//!
//! A client can only be hard-deleted while no policy references it. The
//! reference check is expressed through the [`PolicyReferences`] port so this
//! crate stays independent of the policy domain.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_party::{ClientService, NewClient};
//!
//! let service = ClientService::new(client_port, policy_references);
//! let client = service.create(NewClient::new("V-12345678", "Ana", "Pérez")).await?;
//! ```

pub mod client;
pub mod error;
pub mod validation;
pub mod ports;
pub mod services;

pub use client::{Client, ClientSummary, NewClient, ClientUpdate, ClientQuery};
pub use error::ClientError;
pub use validation::{ClientValidator, ValidationResult};
pub use ports::{ClientPort, PolicyReferences};
pub use services::ClientService;
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::{MockClientPort, MockPolicyReferences};
