//! Statement builder.
//!
//! Pure functions over [`TableMetadata`] returning a [`Statement`]: CQL text plus
//! the names of its bind markers in the order they appear in the text.
//! Column sets are always emitted in declaration order, so equal inputs give
//! byte-identical text and the driver's statement cache keyed by text stays hot.

use std::fmt;

use tracing::trace;

use super::TableMetadata;
use crate::error::{CqlxError, Result};

/// Kind of generated statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    /// `INSERT` of every column.
    Insert,
    /// `SELECT` filtered on the full primary key.
    Get,
    /// `SELECT` filtered on the partition key.
    Select,
    /// `UPDATE` filtered on the full primary key.
    Update,
    /// `DELETE` filtered on the full primary key.
    Delete,
    /// Hand-written statement.
    Custom,
}

/// Generated statement text with its placeholder list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Statement {
    kind: StatementKind,
    text: String,
    /// Result columns for reads, empty otherwise.
    columns: Vec<String>,
    names: Vec<String>,
}

impl Statement {
    pub(crate) fn new(
        kind: StatementKind,
        text: String,
        columns: Vec<String>,
        names: Vec<String>,
    ) -> Self {
        Statement {
            kind,
            text,
            columns,
            names,
        }
    }

    /// Wraps hand-written CQL whose bind markers are `names`.
    #[must_use]
    pub fn custom(text: impl Into<String>, names: Vec<String>) -> Self {
        Statement::new(StatementKind::Custom, text.into(), Vec::new(), names)
    }

    /// Returns the statement kind.
    #[must_use]
    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    /// Returns the CQL text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the projected columns of a read statement.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the placeholder list, in bind marker order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Splits into statement text and placeholder list.
    #[must_use]
    pub fn into_parts(self) -> (String, Vec<String>) {
        (self.text, self.names)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Returns `a=? AND b=?` for the given columns.
#[must_use]
pub fn equality_clause(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| format!("{c}=?"))
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// Resolves a caller filter to table columns in declaration order.
///
/// An empty filter selects every column. Duplicates collapse.
fn resolve_filter(metadata: &TableMetadata, filter: &[&str]) -> Result<Vec<String>> {
    if filter.is_empty() {
        return Ok(metadata.columns().to_vec());
    }

    let mut selected = vec![false; metadata.columns().len()];
    for column in filter {
        let i = metadata
            .column_index(column)
            .ok_or_else(|| CqlxError::UnknownColumn {
                table: metadata.name().to_string(),
                column: (*column).to_string(),
            })?;
        selected[i] = true;
    }

    Ok(metadata
        .columns()
        .iter()
        .zip(selected)
        .filter_map(|(c, keep)| keep.then(|| c.clone()))
        .collect())
}

fn read(
    kind: StatementKind,
    metadata: &TableMetadata,
    columns: Vec<String>,
    keys: Vec<String>,
) -> Statement {
    let text = format!(
        "SELECT {} FROM {} WHERE {}",
        columns.join(","),
        metadata.name(),
        equality_clause(&keys)
    );
    trace!(table = metadata.name(), ?kind, "built statement");
    Statement::new(kind, text, columns, keys)
}

pub(crate) fn get_all(metadata: &TableMetadata) -> Statement {
    let keys = metadata.primary_key().cloned().collect();
    read(StatementKind::Get, metadata, metadata.columns().to_vec(), keys)
}

pub(crate) fn select_all(metadata: &TableMetadata) -> Statement {
    let keys = metadata.part_key().to_vec();
    read(StatementKind::Select, metadata, metadata.columns().to_vec(), keys)
}

/// Builds an INSERT of every column, in declaration order.
#[must_use]
pub fn insert(metadata: &TableMetadata) -> Statement {
    let columns = metadata.columns().to_vec();
    let markers = vec!["?"; columns.len()].join(",");
    let text = format!(
        "INSERT INTO {} ({}) VALUES ({markers})",
        metadata.name(),
        columns.join(",")
    );
    trace!(table = metadata.name(), kind = ?StatementKind::Insert, "built statement");
    Statement::new(StatementKind::Insert, text, Vec::new(), columns)
}

/// Builds a SELECT of `filter` (all columns when empty) by full primary key.
///
/// # Errors
///
/// Returns `UnknownColumn` if the filter names a column the table lacks.
pub fn get(metadata: &TableMetadata, filter: &[&str]) -> Result<Statement> {
    let columns = resolve_filter(metadata, filter)?;
    let keys = metadata.primary_key().cloned().collect();
    Ok(read(StatementKind::Get, metadata, columns, keys))
}

/// Builds a SELECT of `filter` (all columns when empty) by partition key.
///
/// # Errors
///
/// Returns `UnknownColumn` if the filter names a column the table lacks.
pub fn select(metadata: &TableMetadata, filter: &[&str]) -> Result<Statement> {
    let columns = resolve_filter(metadata, filter)?;
    let keys = metadata.part_key().to_vec();
    Ok(read(StatementKind::Select, metadata, columns, keys))
}

/// Builds an UPDATE of `filter` (all non-key columns when empty) by full primary key.
///
/// # Errors
///
/// Returns an error if:
/// - The filter names a column the table lacks (`UnknownColumn`)
/// - The filter names a key column (`InvalidUpdateColumn`)
/// - There is nothing to set (`NothingToUpdate`)
pub fn update(metadata: &TableMetadata, filter: &[&str]) -> Result<Statement> {
    let set: Vec<String> = if filter.is_empty() {
        metadata
            .columns()
            .iter()
            .filter(|c| !metadata.is_key_column(c))
            .cloned()
            .collect()
    } else {
        let columns = resolve_filter(metadata, filter)?;
        if let Some(key) = columns.iter().find(|c| metadata.is_key_column(c)) {
            return Err(CqlxError::InvalidUpdateColumn {
                table: metadata.name().to_string(),
                column: key.clone(),
            });
        }
        columns
    };

    if set.is_empty() {
        return Err(CqlxError::NothingToUpdate {
            table: metadata.name().to_string(),
        });
    }

    let keys: Vec<String> = metadata.primary_key().cloned().collect();
    let text = format!(
        "UPDATE {} SET {} WHERE {}",
        metadata.name(),
        set.iter()
            .map(|c| format!("{c}=?"))
            .collect::<Vec<_>>()
            .join(","),
        equality_clause(&keys)
    );
    trace!(table = metadata.name(), kind = ?StatementKind::Update, "built statement");

    let mut names = set;
    names.extend(keys);
    Ok(Statement::new(StatementKind::Update, text, Vec::new(), names))
}

/// Builds a DELETE by full primary key.
#[must_use]
pub fn delete(metadata: &TableMetadata) -> Statement {
    let keys: Vec<String> = metadata.primary_key().cloned().collect();
    let text = format!(
        "DELETE FROM {} WHERE {}",
        metadata.name(),
        equality_clause(&keys)
    );
    trace!(table = metadata.name(), kind = ?StatementKind::Delete, "built statement");
    Statement::new(StatementKind::Delete, text, Vec::new(), keys)
}
