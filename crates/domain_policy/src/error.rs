//! Policy domain errors
//!
//! This module defines all error types that can occur within the
//! policy and coverage domain.

use thiserror::Error;

use core_kernel::{ClientId, CoverageId, PolicyId, PortError, TemporalError};

/// Errors that can occur in the policy domain
#[derive(Debug, Error)]
pub enum PolicyError {
    /// Policy with the given ID was not found
    #[error("Policy not found: {0}")]
    NotFound(PolicyId),

    /// No policy number ends with the requested fragment
    #[error("No policy matches number {0}")]
    NumberNotFound(String),

    /// The owning client does not exist or is inactive
    #[error("Client not found: {0}")]
    ClientNotFound(ClientId),

    /// Coverage with the given ID was not found
    #[error("Coverage not found: {0}")]
    CoverageNotFound(CoverageId),

    /// No active coverage carries the given name
    #[error("No active coverage named {0}")]
    CoverageNameNotFound(String),

    /// Another coverage already uses this name
    #[error("A coverage named {0} already exists")]
    DuplicateCoverage(String),

    /// Policies still reference the coverage by name
    #[error("Cannot delete coverage {name}: {count} policy(ies) use it; deactivate it instead")]
    CoverageInUse { name: String, count: u64 },

    /// Input failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Calendar arithmetic failed
    #[error(transparent)]
    Temporal(#[from] TemporalError),

    /// Storage failure
    #[error(transparent)]
    Port(#[from] PortError),
}

impl PolicyError {
    /// Creates a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        PolicyError::Validation(message.into())
    }

    /// Creates a validation error from collected messages
    pub fn validation_failed(errors: Vec<String>) -> Self {
        PolicyError::Validation(errors.join("; "))
    }
}
