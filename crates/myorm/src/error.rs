//! Error types for myorm

use thiserror::Error;

/// Result type alias for myorm operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Error types for query building and execution
#[derive(Debug, Error)]
pub enum OrmError {
    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] mysql_async::Error),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unique constraint violation
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Validation error (identifier shape, type-size argument, misused API)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Builder state error (required clause missing at build/execute time)
    #[error("Invalid builder state: {0}")]
    State(String),

    /// Operator kind not present in the operator table for the given context
    #[error("Unsupported operator {op} in {context} expression")]
    UnsupportedOperator {
        op: &'static str,
        context: &'static str,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl OrmError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a builder state error
    pub fn state(message: impl Into<String>) -> Self {
        Self::State(message.into())
    }

    /// Check if this is a unique violation error
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation(_))
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Parse a mysql_async error into a more specific OrmError
    pub fn from_db_error(err: mysql_async::Error) -> Self {
        if let mysql_async::Error::Server(ref server) = err {
            // MySQL error numbers: 1062 duplicate entry, 1451/1452 FK restrict
            match server.code {
                1062 => return Self::UniqueViolation(server.message.clone()),
                1451 | 1452 => return Self::ForeignKeyViolation(server.message.clone()),
                _ => {}
            }
        }
        Self::Query(err)
    }
}
