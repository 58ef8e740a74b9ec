use thiserror::Error;

/// Error type for pgmodel operations
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Errors raised by PostgreSQL are passed through untouched.
    #[error(transparent)]
    Postgres(#[from] tokio_postgres::Error),

    #[error("Expected {expected} row(s), got {actual}")]
    UnexpectedRowCount { expected: usize, actual: usize },

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("Invalid value for column {column}: {value:?}")]
    InvalidValue { column: String, value: String },

    #[error("Column {column} has type {type_name}, which has no text mapping")]
    UnsupportedType { column: String, type_name: String },

    #[error("Invalid batch: {0}")]
    InvalidBatch(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Refusing to delete from {0} without a WHERE clause")]
    UnboundedDelete(String),
}

/// Result type alias for pgmodel operations
pub type Result<T> = std::result::Result<T, ModelError>;
