//! Column name to field path mapping for one record type.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, warn};

use super::{FieldDef, FieldKind, Fields, Record};
use crate::error::{CqlxError, Result};
use crate::types::{Value, ValueTypeError};

/// Ordered field identifiers leading from a record to a scalar field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<&'static str>);

impl FieldPath {
    /// Returns the identifiers in the path.
    #[must_use]
    pub fn segments(&self) -> &[&'static str] {
        &self.0
    }

    /// Reads the field at this path.
    #[must_use]
    pub fn read(&self, record: &dyn Fields) -> Option<Value> {
        let (last, parents) = self.0.split_last()?;
        let mut current = record;
        for ident in parents {
            current = current.embedded(ident)?;
        }
        current.field(last)
    }

    /// Writes the field at this path.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` if the value cannot be converted to the field type.
    pub fn write(&self, record: &mut dyn Fields, column: &str, value: Value) -> Result<()> {
        let Some((last, parents)) = self.0.split_last() else {
            return Ok(());
        };
        write_at(record, parents, last, value).map_err(|e| e.for_column(column))
    }
}

fn write_at(
    record: &mut dyn Fields,
    parents: &[&'static str],
    last: &str,
    value: Value,
) -> std::result::Result<(), ValueTypeError> {
    match parents.split_first() {
        None => record.set_field(last, value),
        Some((head, rest)) => match record.embedded_mut(head) {
            Some(next) => write_at(next, rest, last, value),
            None => Ok(()),
        },
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

/// Mapping from column names to field paths for one record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    record: &'static str,
    /// Columns in field declaration order.
    entries: Vec<(String, FieldPath)>,
    index: HashMap<String, usize>,
}

impl Mapping {
    /// Builds the mapping for `T` without consulting the cache.
    ///
    /// # Errors
    ///
    /// Returns `MappingCollision` if two fields resolve to the same column.
    pub fn build<T: Record>() -> Result<Self> {
        Self::from_fields(T::record_name(), &T::fields())
    }

    /// Builds a mapping from explicit field declarations.
    ///
    /// # Errors
    ///
    /// Returns `MappingCollision` if two fields resolve to the same column.
    pub fn from_fields(record: &'static str, fields: &[FieldDef]) -> Result<Self> {
        let mut mapping = Mapping {
            record,
            entries: Vec::new(),
            index: HashMap::new(),
        };
        mapping.walk(fields, &[])?;
        debug!(record, columns = mapping.entries.len(), "built column mapping");
        Ok(mapping)
    }

    fn walk(&mut self, fields: &[FieldDef], prefix: &[&'static str]) -> Result<()> {
        for def in fields.iter().filter(|d| !d.skip) {
            let mut path = prefix.to_vec();
            path.push(def.ident);

            match def.kind {
                FieldKind::Embedded(fields) => self.walk(&fields(), &path)?,
                FieldKind::Scalar => {
                    let column = def.column_name().unwrap_or_default();
                    self.insert(column, FieldPath(path))?;
                }
            }
        }
        Ok(())
    }

    fn insert(&mut self, column: String, path: FieldPath) -> Result<()> {
        if let Some(&i) = self.index.get(&column) {
            let first = self.entries[i].1.to_string();
            warn!(record = self.record, %column, %first, second = %path, "column mapping collision");
            return Err(CqlxError::MappingCollision {
                record: self.record,
                column,
                first,
                second: path.to_string(),
            });
        }
        self.index.insert(column.clone(), self.entries.len());
        self.entries.push((column, path));
        Ok(())
    }

    /// Returns the record type name.
    #[must_use]
    pub fn record(&self) -> &'static str {
        self.record
    }

    /// Returns the field path for a column, ignoring ASCII case.
    #[must_use]
    pub fn field_path(&self, column: &str) -> Option<&FieldPath> {
        let i = match self.index.get(column) {
            Some(&i) => i,
            None => *self.index.get(&column.to_ascii_lowercase())?,
        };
        Some(&self.entries[i].1)
    }

    /// Returns true if the column is mapped.
    #[must_use]
    pub fn contains(&self, column: &str) -> bool {
        self.field_path(column).is_some()
    }

    /// Returns mapped column names in declaration order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(c, _)| c.as_str())
    }

    /// Returns the number of mapped columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no column is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reads the value mapped to `column` from a record.
    #[must_use]
    pub fn read(&self, record: &dyn Fields, column: &str) -> Option<Value> {
        self.field_path(column)?.read(record)
    }

    /// Writes `value` to the field mapped to `column`.
    ///
    /// Returns false if the column is not mapped.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` if the value cannot be converted to the field type.
    pub fn write(&self, record: &mut dyn Fields, column: &str, value: Value) -> Result<bool> {
        match self.field_path(column) {
            Some(path) => {
                path.write(record, column, value)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
