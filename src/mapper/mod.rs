//! Name mapper: record fields to column names.
//!
//! Rust has no runtime field discovery, so a record type registers its shape
//! through [`Record::fields`] and exposes field access through [`Fields`].
//! The mapper walks that shape once per type:
//! - Field identifiers become lower snake case column names
//! - [`FieldDef::rename`] overrides the column name
//! - [`FieldDef::skip`] removes the field from the mapping
//! - [`FieldDef::embedded`] flattens a nested record into the parent namespace
//!
//! Results are memoized per type in a process-wide cache, see [`mapping_for`].

mod cache;
mod mapping;
mod naming;

pub use cache::{mapping_for, MappingCache};
pub use mapping::{FieldPath, Mapping};
pub use naming::to_snake_case;

use crate::types::{Value, ValueTypeError};

/// Field access for a record instance, keyed by field identifier.
pub trait Fields {
    /// Reads a scalar field. Returns None for unknown identifiers.
    fn field(&self, ident: &str) -> Option<Value>;

    /// Writes a scalar field. Unknown identifiers are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be converted to the field's type.
    fn set_field(&mut self, ident: &str, value: Value) -> std::result::Result<(), ValueTypeError>;

    /// Returns an embedded record by identifier.
    fn embedded(&self, _ident: &str) -> Option<&dyn Fields> {
        None
    }

    /// Returns an embedded record by identifier for writing.
    fn embedded_mut(&mut self, _ident: &str) -> Option<&mut dyn Fields> {
        None
    }
}

/// A record type whose shape can be mapped to table columns.
pub trait Record: Fields + 'static {
    /// Declares the record's fields in declaration order.
    fn fields() -> Vec<FieldDef>;

    /// Name used in diagnostics.
    fn record_name() -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// How a field participates in the mapping.
#[derive(Debug, Clone, Copy)]
pub(crate) enum FieldKind {
    Scalar,
    Embedded(fn() -> Vec<FieldDef>),
}

/// Declaration of a single record field.
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub(crate) ident: &'static str,
    pub(crate) column: Option<String>,
    pub(crate) skip: bool,
    pub(crate) kind: FieldKind,
}

impl FieldDef {
    /// Declares a scalar field mapped by the default naming rule.
    #[must_use]
    pub fn new(ident: &'static str) -> Self {
        FieldDef {
            ident,
            column: None,
            skip: false,
            kind: FieldKind::Scalar,
        }
    }

    /// Declares a nested record whose fields are flattened into the parent.
    #[must_use]
    pub fn embedded<T: Record>(ident: &'static str) -> Self {
        FieldDef {
            ident,
            column: None,
            skip: false,
            kind: FieldKind::Embedded(T::fields),
        }
    }

    /// Sets an explicit column name. Has no effect on embedded fields.
    #[must_use]
    pub fn rename(mut self, column: &str) -> Self {
        self.column = Some(column.to_ascii_lowercase());
        self
    }

    /// Marks the field as non-persistent.
    #[must_use]
    pub fn skip(mut self) -> Self {
        self.skip = true;
        self
    }

    /// Returns the field identifier.
    #[must_use]
    pub fn ident(&self) -> &'static str {
        self.ident
    }

    /// Returns the column name this field maps to, or None for skipped and embedded fields.
    #[must_use]
    pub fn column_name(&self) -> Option<String> {
        if self.skip || matches!(self.kind, FieldKind::Embedded(_)) {
            return None;
        }
        Some(
            self.column
                .clone()
                .unwrap_or_else(|| to_snake_case(self.ident)),
        )
    }
}
