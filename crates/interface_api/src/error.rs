//! API error handling
//!
//! Every handler returns `Result<_, ApiError>`. Domain errors convert with
//! `?`; the response body is always `{"error": <kind>, "message": <text>}`.
//! Server-side failures are logged and answered with a generic message.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use core_kernel::PortError;
use domain_access::AccessError;
use domain_party::ClientError;
use domain_policy::PolicyError;

use crate::auth::AuthError;

const INTERNAL_MESSAGE: &str = "Internal server error";
const CONFLICT_MESSAGE: &str = "The request conflicts with existing data";

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "not_found",
            ApiError::Validation(_) => "validation_error",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::Conflict(_) => "conflict",
            ApiError::Unavailable(_) => "service_unavailable",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind();
        let message = match self {
            ApiError::Internal(detail) | ApiError::Unavailable(detail) => {
                error!(status = status.as_u16(), error = %detail, "Request failed");
                INTERNAL_MESSAGE.to_string()
            }
            ApiError::NotFound(msg)
            | ApiError::Validation(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::Conflict(msg) => msg,
        };

        let body = ErrorResponse {
            error: kind.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<PortError> for ApiError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            PortError::Validation { message, .. } => ApiError::Validation(message),
            PortError::Conflict { message } => {
                warn!(detail = %message, "Storage conflict");
                ApiError::Conflict(CONFLICT_MESSAGE.to_string())
            }
            PortError::Connection { .. } => ApiError::Unavailable(err.to_string()),
            PortError::Internal { .. } => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::NotFound(_) => ApiError::NotFound(err.to_string()),
            ClientError::DuplicateCedula(_) | ClientError::HasPolicies { .. } => {
                ApiError::Conflict(err.to_string())
            }
            ClientError::Validation(message) => ApiError::Validation(message),
            ClientError::Port(port) => port.into(),
        }
    }
}

impl From<PolicyError> for ApiError {
    fn from(err: PolicyError) -> Self {
        match err {
            PolicyError::NotFound(_)
            | PolicyError::NumberNotFound(_)
            | PolicyError::ClientNotFound(_)
            | PolicyError::CoverageNotFound(_)
            | PolicyError::CoverageNameNotFound(_) => ApiError::NotFound(err.to_string()),
            PolicyError::DuplicateCoverage(_) | PolicyError::CoverageInUse { .. } => {
                ApiError::Conflict(err.to_string())
            }
            PolicyError::Validation(message) => ApiError::Validation(message),
            PolicyError::Temporal(_) => ApiError::Validation(err.to_string()),
            PolicyError::Port(port) => port.into(),
        }
    }
}

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
            AccessError::Forbidden(message) => ApiError::Forbidden(message),
            AccessError::RegistrationClosed => ApiError::Forbidden(err.to_string()),
            AccessError::NotFound(_) => ApiError::NotFound(err.to_string()),
            AccessError::Duplicate { .. } => ApiError::Conflict(err.to_string()),
            AccessError::Validation(message) => ApiError::Validation(message),
            AccessError::Hashing(_) => ApiError::Internal(err.to_string()),
            AccessError::Port(port) => port.into(),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Signing(_) => ApiError::Internal(err.to_string()),
            _ => ApiError::Unauthorized(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}
