//! Access domain errors

use thiserror::Error;

use core_kernel::{PortError, UserId};

/// Errors that can occur in the access domain
#[derive(Debug, Error)]
pub enum AccessError {
    /// Unknown user, wrong password or inactive account
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The caller's role does not allow the operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("User not found: {0}")]
    NotFound(UserId),

    /// Username or email already taken
    #[error("{field} already in use: {value}")]
    Duplicate { field: &'static str, value: String },

    /// Bootstrap registration after the first account exists
    #[error("Registration is closed")]
    RegistrationClosed,

    #[error("Validation error: {0}")]
    Validation(String),

    /// Password hashing failure
    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error(transparent)]
    Port(#[from] PortError),
}

impl AccessError {
    pub fn forbidden(message: impl Into<String>) -> Self {
        AccessError::Forbidden(message.into())
    }
}
