//! Declarative table description.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{CqlxError, Result};

/// Name, columns and primary key of a table.
///
/// Constructed once through [`TableMetadata::new`] (or deserialization, which
/// runs the same validation) and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MetadataDef")]
pub struct TableMetadata {
    name: String,
    columns: Vec<String>,
    part_key: Vec<String>,
    sort_key: Vec<String>,
}

/// Unvalidated wire form of [`TableMetadata`].
#[derive(Deserialize)]
struct MetadataDef {
    name: String,
    columns: Vec<String>,
    part_key: Vec<String>,
    #[serde(default)]
    sort_key: Vec<String>,
}

impl TryFrom<MetadataDef> for TableMetadata {
    type Error = CqlxError;

    fn try_from(def: MetadataDef) -> Result<Self> {
        TableMetadata::new(def.name, def.columns, def.part_key, def.sort_key)
    }
}

fn owned<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}

impl TableMetadata {
    /// Creates validated table metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The name is empty (`EmptyTableName`)
    /// - A column or key column is listed twice (`DuplicateColumn`)
    /// - The partition key is empty (`EmptyPartitionKey`)
    /// - A key column is not a table column (`UnknownKeyColumn`)
    /// - A column is in both partition and sort key (`KeyOverlap`)
    pub fn new<C, P, S>(name: impl Into<String>, columns: C, part_key: P, sort_key: S) -> Result<Self>
    where
        C: IntoIterator,
        C::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        let metadata = TableMetadata {
            name: name.into(),
            columns: owned(columns),
            part_key: owned(part_key),
            sort_key: owned(sort_key),
        };
        metadata.validate()?;
        Ok(metadata)
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CqlxError::EmptyTableName);
        }

        self.check_unique(&self.columns)?;
        self.check_unique(&self.part_key)?;
        self.check_unique(&self.sort_key)?;

        if self.part_key.is_empty() {
            return Err(CqlxError::EmptyPartitionKey {
                table: self.name.clone(),
            });
        }

        for key in self.part_key.iter().chain(&self.sort_key) {
            if !self.has_column(key) {
                return Err(CqlxError::UnknownKeyColumn {
                    table: self.name.clone(),
                    column: key.clone(),
                });
            }
        }

        if let Some(col) = self
            .sort_key
            .iter()
            .find(|s| self.part_key.iter().any(|p| p.eq_ignore_ascii_case(s)))
        {
            return Err(CqlxError::KeyOverlap {
                table: self.name.clone(),
                column: col.clone(),
            });
        }

        Ok(())
    }

    fn check_unique(&self, columns: &[String]) -> Result<()> {
        let mut seen = HashSet::with_capacity(columns.len());
        for col in columns {
            if !seen.insert(col.to_ascii_lowercase()) {
                return Err(CqlxError::DuplicateColumn {
                    table: self.name.clone(),
                    column: col.clone(),
                });
            }
        }
        Ok(())
    }

    /// Returns the table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns all columns in declaration order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the partition key columns.
    #[must_use]
    pub fn part_key(&self) -> &[String] {
        &self.part_key
    }

    /// Returns the sort (clustering) key columns.
    #[must_use]
    pub fn sort_key(&self) -> &[String] {
        &self.sort_key
    }

    /// Returns the primary key: partition key followed by sort key.
    pub fn primary_key(&self) -> impl Iterator<Item = &String> {
        self.part_key.iter().chain(&self.sort_key)
    }

    /// Returns true if `column` is a table column, ignoring ASCII case.
    #[must_use]
    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    /// Finds the declaration index of a column, ignoring ASCII case.
    #[must_use]
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(column))
    }

    /// Returns true if `column` is part of the primary key.
    #[must_use]
    pub fn is_key_column(&self, column: &str) -> bool {
        self.primary_key().any(|k| k.eq_ignore_ascii_case(column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person() -> Result<TableMetadata> {
        TableMetadata::new(
            "person",
            ["first_name", "last_name", "email"],
            ["first_name"],
            ["last_name"],
        )
    }

    #[test]
    fn test_valid_metadata() {
        let md = person().unwrap();
        assert_eq!(md.name(), "person");
        assert_eq!(
            md.primary_key().collect::<Vec<_>>(),
            vec!["first_name", "last_name"]
        );
        assert!(md.is_key_column("LAST_NAME"));
        assert!(!md.is_key_column("email"));
    }

    #[test]
    fn test_empty_partition_key() {
        let err = TableMetadata::new("t", ["a"], Vec::<String>::new(), Vec::<String>::new())
            .unwrap_err();
        assert!(matches!(err, CqlxError::EmptyPartitionKey { .. }));
    }

    #[test]
    fn test_unknown_key_column() {
        let err = TableMetadata::new("t", ["a"], ["a"], ["b"]).unwrap_err();
        assert!(matches!(err, CqlxError::UnknownKeyColumn { ref column, .. } if column == "b"));
    }

    #[test]
    fn test_key_overlap() {
        let err = TableMetadata::new("t", ["a", "b"], ["a"], ["a"]).unwrap_err();
        assert!(matches!(err, CqlxError::KeyOverlap { ref column, .. } if column == "a"));
    }

    #[test]
    fn test_duplicate_column() {
        let err = TableMetadata::new("t", ["a", "A"], ["a"], Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, CqlxError::DuplicateColumn { .. }));
        assert!(err.is_structural());
    }

    #[test]
    fn test_empty_name() {
        let err = TableMetadata::new(" ", ["a"], ["a"], Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, CqlxError::EmptyTableName));
    }
}
