//! Table with precomputed statements.

use std::sync::Arc;

use tracing::debug;

use super::builder::{self, equality_clause, Statement};
use super::TableMetadata;
use crate::error::{CqlxError, Result};

/// Simple CRUD statements for one table.
///
/// The unfiltered statements are built once in [`Table::new`] and handed out
/// by reference. A `Table` is immutable and can be shared across threads.
#[derive(Debug, Clone)]
pub struct Table {
    metadata: Arc<TableMetadata>,
    insert: Statement,
    get: Statement,
    select: Statement,
    update: Option<Statement>,
    delete: Statement,
}

impl Table {
    /// Creates a table and precomputes its statements.
    #[must_use]
    pub fn new(metadata: TableMetadata) -> Self {
        Self::from_shared(Arc::new(metadata))
    }

    /// Creates a table from shared metadata.
    #[must_use]
    pub fn from_shared(metadata: Arc<TableMetadata>) -> Self {
        let md = metadata.as_ref();
        let update = builder::update(md, &[]).ok();

        debug!(
            table = md.name(),
            columns = md.columns().len(),
            updatable = update.is_some(),
            "prepared table statements"
        );

        Table {
            insert: builder::insert(md),
            get: builder::get_all(md),
            select: builder::select_all(md),
            update,
            delete: builder::delete(md),
            metadata,
        }
    }

    /// Returns the table name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.metadata.name()
    }

    /// Returns the table metadata.
    #[must_use]
    pub fn metadata(&self) -> &TableMetadata {
        &self.metadata
    }

    /// Returns `pk1=? AND ...` over the full primary key.
    #[must_use]
    pub fn primary_key_cmp(&self) -> String {
        let keys: Vec<String> = self.metadata.primary_key().cloned().collect();
        equality_clause(&keys)
    }

    /// Returns `pk1=? AND ...` over the partition key.
    #[must_use]
    pub fn partition_key_cmp(&self) -> String {
        equality_clause(self.metadata.part_key())
    }

    /// Returns the INSERT of every column.
    #[must_use]
    pub fn insert(&self) -> &Statement {
        &self.insert
    }

    /// Returns the SELECT of every column by primary key.
    #[must_use]
    pub fn get(&self) -> &Statement {
        &self.get
    }

    /// Returns a SELECT of `columns` by primary key.
    ///
    /// # Errors
    ///
    /// Returns `UnknownColumn` if a column is not in the table.
    pub fn get_columns(&self, columns: &[&str]) -> Result<Statement> {
        builder::get(&self.metadata, columns)
    }

    /// Returns the SELECT of every column by partition key.
    #[must_use]
    pub fn select(&self) -> &Statement {
        &self.select
    }

    /// Returns a SELECT of `columns` by partition key.
    ///
    /// # Errors
    ///
    /// Returns `UnknownColumn` if a column is not in the table.
    pub fn select_columns(&self, columns: &[&str]) -> Result<Statement> {
        builder::select(&self.metadata, columns)
    }

    /// Returns the UPDATE of every non-key column by primary key.
    ///
    /// # Errors
    ///
    /// Returns `NothingToUpdate` if every column is a key column.
    pub fn update(&self) -> Result<&Statement> {
        self.update.as_ref().ok_or_else(|| CqlxError::NothingToUpdate {
            table: self.name().to_string(),
        })
    }

    /// Returns an UPDATE of `columns` by primary key.
    ///
    /// # Errors
    ///
    /// Returns `UnknownColumn` or `InvalidUpdateColumn` for a bad column list.
    pub fn update_columns(&self, columns: &[&str]) -> Result<Statement> {
        builder::update(&self.metadata, columns)
    }

    /// Returns the DELETE by primary key.
    #[must_use]
    pub fn delete(&self) -> &Statement {
        &self.delete
    }
}
