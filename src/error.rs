//! Error types for cqlx operations.

use thiserror::Error;

/// Result type alias using [`CqlxError`].
pub type Result<T> = std::result::Result<T, CqlxError>;

/// Failure reported by the external driver session.
pub type DriverError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error types for cqlx operations.
#[derive(Debug, Error)]
pub enum CqlxError {
    // ==================== Mapping Errors ====================
    /// Two fields of a record map to the same column.
    #[error("Mapping collision in {record}: column '{column}' is claimed by both '{first}' and '{second}'")]
    MappingCollision {
        record: &'static str,
        column: String,
        first: String,
        second: String,
    },

    // ==================== Binding Errors ====================
    /// No source supplied a value for a placeholder.
    #[error("Missing binding for column '{column}'")]
    MissingBinding { column: String },

    /// A value cannot be represented as the requested type.
    #[error("Type mismatch for column '{column}': expected {expected}, got {actual}")]
    TypeMismatch {
        column: String,
        expected: String,
        actual: String,
    },

    /// The placeholder list names a column twice or disagrees with its parameter types.
    #[error("Malformed placeholder list: {0}")]
    MalformedPlaceholderList(String),

    // ==================== Table Metadata Errors ====================
    /// Table name is empty.
    #[error("Table name cannot be empty")]
    EmptyTableName,

    /// Table declares no partition key columns.
    #[error("Table '{table}' must declare at least one partition key column")]
    EmptyPartitionKey { table: String },

    /// A key column is not among the table columns.
    #[error("Table '{table}': key column '{column}' is not a table column")]
    UnknownKeyColumn { table: String, column: String },

    /// A column is part of both the partition key and the sort key.
    #[error("Table '{table}': column '{column}' is in both partition key and sort key")]
    KeyOverlap { table: String, column: String },

    /// A column is declared twice.
    #[error("Table '{table}': duplicate column '{column}'")]
    DuplicateColumn { table: String, column: String },

    // ==================== Statement Builder Errors ====================
    /// A column filter names a column the table does not have.
    #[error("Table '{table}': unknown column '{column}'")]
    UnknownColumn { table: String, column: String },

    /// A primary key column was requested in a SET clause.
    #[error("Table '{table}': key column '{column}' cannot be updated")]
    InvalidUpdateColumn { table: String, column: String },

    /// The table has no non-key column to update.
    #[error("Table '{table}' has no columns to update")]
    NothingToUpdate { table: String },

    /// Hand-written statement text could not be compiled.
    #[error("Malformed statement at byte {position}: {message}")]
    MalformedStatement { position: usize, message: String },

    // ==================== Execution Errors ====================
    /// The driver failed to prepare a statement.
    #[error("Prepare error for '{statement}': {source}")]
    PrepareError {
        statement: String,
        #[source]
        source: DriverError,
    },

    /// The driver failed to execute a statement.
    #[error("Execution error for '{statement}': {source}")]
    ExecutionError {
        statement: String,
        #[source]
        source: DriverError,
    },

    /// A single-row fetch returned no rows.
    #[error("Not found: '{statement}' returned no rows")]
    NotFound { statement: String },

    /// A single-row fetch returned more than one row.
    #[error("Multiple rows: '{statement}' returned more than one row")]
    MultipleRows { statement: String },

    /// A returned column has no destination field.
    #[error("Column '{column}' has no field in {record}")]
    UnmappedColumn { record: &'static str, column: String },

    /// The query was used after release.
    #[error("Query has been released")]
    QueryReleased,
}

impl CqlxError {
    /// Returns true for errors raised at construction or build time.
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            CqlxError::MappingCollision { .. }
                | CqlxError::EmptyTableName
                | CqlxError::EmptyPartitionKey { .. }
                | CqlxError::UnknownKeyColumn { .. }
                | CqlxError::KeyOverlap { .. }
                | CqlxError::DuplicateColumn { .. }
                | CqlxError::UnknownColumn { .. }
                | CqlxError::InvalidUpdateColumn { .. }
                | CqlxError::NothingToUpdate { .. }
                | CqlxError::MalformedStatement { .. }
        )
    }

    /// Returns true for per-bind errors the caller can fix by supplying other sources.
    #[must_use]
    pub fn is_binding_error(&self) -> bool {
        matches!(
            self,
            CqlxError::MissingBinding { .. }
                | CqlxError::TypeMismatch { .. }
                | CqlxError::MalformedPlaceholderList(_)
        )
    }

    pub(crate) fn type_mismatch(
        column: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        CqlxError::TypeMismatch {
            column: column.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}
