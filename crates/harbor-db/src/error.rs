//! # Database Error Types
//!
//! Error types for database operations and the transactional services.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError ← Adds context and categorization                             │
//! │       │                                                                 │
//! │       │        CoreError (stock, product, payment method, ...)         │
//! │       │           │                                                     │
//! │       ▼           ▼                                                     │
//! │  ServiceError { Core | Db } ← returned by a unit of work, after        │
//! │       │                        its transaction was rolled back          │
//! │       ▼                                                                 │
//! │  ApiError (in hq-api) ← status code + {ok:false, error:CODE}           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use harbor_core::CoreError;
use thiserror::Error;

/// Database operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and for the retry decisions of the services.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Order number or check number collision (retried by the services)
    /// - Any other UNIQUE index violation
    ///
    /// `field` is `table.column` as reported by SQLite.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Order for a store that does not exist
    /// - Payment referencing a missing payment method
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Begin / commit / rollback failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// True when this is a unique violation on `column` (e.g. `order_no`).
    pub fn is_unique_violation_on(&self, column: &str) -> bool {
        match self {
            DbError::UniqueViolation { field, .. } => field
                .split(", ")
                .any(|f| f == column || f.rsplit('.').next() == Some(column)),
            _ => false,
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // "UNIQUE constraint failed: <table>.<column>"
                // "FOREIGN KEY constraint failed"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Serializing audit detail or a sync payload.
impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::Internal(format!("JSON encoding failed: {}", err))
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Service Error
// =============================================================================

/// Failure of a unit of work.
///
/// By the time a caller sees this, every write of the unit has been rolled
/// back.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Business rule violated (validation, stock, unknown product, ...).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Infrastructure failure.
    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::Db(err.into())
    }
}

/// Result type for the transactional services.
pub type ServiceResult<T> = Result<T, ServiceError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_violation_column_match() {
        let err = DbError::duplicate("orders.order_no", "SO1");
        assert!(err.is_unique_violation_on("order_no"));
        assert!(err.is_unique_violation_on("orders.order_no"));
        assert!(!err.is_unique_violation_on("check_no"));
        assert!(!DbError::PoolExhausted.is_unique_violation_on("order_no"));
    }

    #[test]
    fn test_service_error_conversions() {
        let err: ServiceError = CoreError::InsufficientStock(3).into();
        assert!(matches!(err, ServiceError::Core(CoreError::InsufficientStock(3))));
        assert_eq!(err.to_string(), CoreError::InsufficientStock(3).to_string());

        let err: ServiceError = DbError::PoolExhausted.into();
        assert!(matches!(err, ServiceError::Db(DbError::PoolExhausted)));
    }
}
