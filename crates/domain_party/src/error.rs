//! Client domain errors

use thiserror::Error;

use core_kernel::{ClientId, PortError};

/// Errors that can occur in the client domain
#[derive(Debug, Error)]
pub enum ClientError {
    /// Client with the given ID was not found
    #[error("Client not found: {0}")]
    NotFound(ClientId),

    /// Another client already holds this identity document
    #[error("A client with cedula {0} already exists")]
    DuplicateCedula(String),

    /// Client data failed validation
    #[error("Invalid client data: {0}")]
    Validation(String),

    /// The client still owns policies and cannot be removed
    #[error("Client has {count} policy(ies) and cannot be deleted")]
    HasPolicies { count: u64 },

    /// Storage failure
    #[error(transparent)]
    Port(#[from] PortError),
}

impl ClientError {
    /// Creates a Validation error from collected messages
    pub fn validation_failed(errors: Vec<String>) -> Self {
        ClientError::Validation(errors.join("; "))
    }
}
