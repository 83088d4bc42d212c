//! Database error types
//!
//! SQLx errors are classified by PostgreSQL SQLSTATE so that constraint
//! violations surface as conflicts instead of generic failures.

use thiserror::Error;

use core_kernel::PortError;

/// Errors that can occur during database operations
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to establish a database connection
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Entity not found in database
    #[error("{entity} with id '{id}' not found")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation (SQLSTATE 23505)
    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    /// Foreign key constraint violation (SQLSTATE 23503)
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check constraint violation (SQLSTATE 23514)
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// A stored value could not be mapped to its domain type
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Pool exhaustion - no available connections
    #[error("Connection pool exhausted")]
    PoolExhausted,
}

impl DatabaseError {
    /// Creates a not found error for a specific entity type and identifier
    ///
    /// # Example
    ///
    /// ```rust
    /// use infra_db::DatabaseError;
    ///
    /// let error = DatabaseError::not_found("Policy", "POL-123");
    /// assert!(error.to_string().contains("Policy"));
    /// ```
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        DatabaseError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        DatabaseError::SerializationError(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DatabaseError::NotFound { .. })
    }

    /// Checks if this error is a constraint violation
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            DatabaseError::DuplicateEntry(_)
                | DatabaseError::ForeignKeyViolation(_)
                | DatabaseError::ConstraintViolation(_)
        )
    }

    /// Checks if this error is a connection-related issue
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            DatabaseError::ConnectionFailed(_) | DatabaseError::PoolExhausted
        )
    }

    /// Classifies a PostgreSQL SQLSTATE code
    pub fn from_sqlstate(code: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            "23505" => DatabaseError::DuplicateEntry(message),
            "23503" => DatabaseError::ForeignKeyViolation(message),
            "23514" => DatabaseError::ConstraintViolation(message),
            _ => DatabaseError::QueryFailed(message),
        }
    }
}

/// Maps SQLx errors to specific variants based on the PostgreSQL error code
///
/// Codes: <https://www.postgresql.org/docs/current/errcodes-appendix.html>
impl From<sqlx::Error> for DatabaseError {
    fn from(error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::RowNotFound => DatabaseError::not_found("Record", "unknown"),
            sqlx::Error::PoolTimedOut => DatabaseError::PoolExhausted,
            sqlx::Error::Io(e) => DatabaseError::ConnectionFailed(e.to_string()),
            sqlx::Error::Database(db_err) => match db_err.code() {
                Some(code) => DatabaseError::from_sqlstate(code.as_ref(), db_err.message()),
                None => DatabaseError::QueryFailed(db_err.message().to_string()),
            },
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                DatabaseError::SerializationError(error.to_string())
            }
            _ => DatabaseError::QueryFailed(error.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DatabaseError {
    fn from(error: sqlx::migrate::MigrateError) -> Self {
        DatabaseError::MigrationFailed(error.to_string())
    }
}

/// Translation to the port error every adapter reports
///
/// - `NotFound` -> `PortError::NotFound`
/// - unique and foreign-key violations -> `PortError::Conflict`
/// - connection problems -> `PortError::Connection`
/// - everything else -> `PortError::Internal`
impl From<DatabaseError> for PortError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::NotFound { entity, id } => PortError::NotFound {
                entity_type: entity,
                id,
            },
            DatabaseError::DuplicateEntry(message) | DatabaseError::ForeignKeyViolation(message) => {
                PortError::conflict(message)
            }
            DatabaseError::ConstraintViolation(message) => PortError::validation(message),
            e @ (DatabaseError::ConnectionFailed(_) | DatabaseError::PoolExhausted) => {
                PortError::connection(e.to_string())
            }
            e => PortError::internal(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlstate_classification() {
        assert!(matches!(
            DatabaseError::from_sqlstate("23505", "dup"),
            DatabaseError::DuplicateEntry(_)
        ));
        assert!(matches!(
            DatabaseError::from_sqlstate("23503", "fk"),
            DatabaseError::ForeignKeyViolation(_)
        ));
        assert!(matches!(
            DatabaseError::from_sqlstate("42P01", "missing table"),
            DatabaseError::QueryFailed(_)
        ));
    }

    #[test]
    fn test_port_error_mapping() {
        let conflict: PortError = DatabaseError::DuplicateEntry("cedula".into()).into();
        assert!(conflict.is_conflict());

        let fk: PortError = DatabaseError::ForeignKeyViolation("client".into()).into();
        assert!(fk.is_conflict());

        let missing: PortError = DatabaseError::not_found("Client", "x").into();
        assert!(missing.is_not_found());

        let pool: PortError = DatabaseError::PoolExhausted.into();
        assert!(matches!(pool, PortError::Connection { .. }));
    }

    #[test]
    fn test_row_not_found() {
        let error: DatabaseError = sqlx::Error::RowNotFound.into();
        assert!(error.is_not_found());
    }
}
