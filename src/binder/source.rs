//! Value sources a binder resolves placeholders against.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::sync::Arc;

use crate::error::Result;
use crate::mapper::{mapping_for, Fields, Mapping, Record};
use crate::types::Value;

/// Key-value source keyed by column name.
pub type ValueMap = HashMap<String, Value>;

/// Anything that can supply a value for a column name.
pub trait ValueSource {
    /// Resolves a column to a value, or None if this source has no value for it.
    fn resolve(&self, column: &str) -> Option<Value>;
}

/// Finds the single key equal to `column` ignoring ASCII case.
///
/// Returns None when several keys differ from `column` only in case.
fn lookup_ignoring_case<'m>(
    entries: impl Iterator<Item = (&'m String, &'m Value)>,
    column: &str,
) -> Option<&'m Value> {
    let mut matches = entries.filter(|(k, _)| k.eq_ignore_ascii_case(column));
    let (_, value) = matches.next()?;
    matches.next().is_none().then_some(value)
}

// Maps resolve an exact key first, then a unique case-insensitive one.
impl<S: BuildHasher> ValueSource for HashMap<String, Value, S> {
    fn resolve(&self, column: &str) -> Option<Value> {
        self.get(column)
            .or_else(|| lookup_ignoring_case(self.iter(), column))
            .cloned()
    }
}

impl ValueSource for BTreeMap<String, Value> {
    fn resolve(&self, column: &str) -> Option<Value> {
        self.get(column)
            .or_else(|| lookup_ignoring_case(self.iter(), column))
            .cloned()
    }
}

impl<T: ValueSource + ?Sized> ValueSource for &T {
    fn resolve(&self, column: &str) -> Option<Value> {
        (**self).resolve(column)
    }
}

/// A record instance viewed through its column mapping.
pub struct RecordSource<'a> {
    record: &'a dyn Fields,
    mapping: Arc<Mapping>,
}

impl<'a> RecordSource<'a> {
    /// Wraps a record using its cached mapping.
    ///
    /// # Errors
    ///
    /// Returns `MappingCollision` if the record type cannot be mapped.
    pub fn new<T: Record>(record: &'a T) -> Result<Self> {
        Ok(RecordSource {
            record,
            mapping: mapping_for::<T>()?,
        })
    }

    /// Wraps a record with an explicit mapping.
    #[must_use]
    pub fn with_mapping(record: &'a dyn Fields, mapping: Arc<Mapping>) -> Self {
        RecordSource { record, mapping }
    }

    /// Returns the mapping used to read the record.
    #[must_use]
    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }
}

impl ValueSource for RecordSource<'_> {
    fn resolve(&self, column: &str) -> Option<Value> {
        self.mapping.read(self.record, column)
    }
}

/// Several sources searched in priority order; later sources win.
#[derive(Default)]
pub struct Layered<'a> {
    sources: Vec<&'a dyn ValueSource>,
}

impl<'a> Layered<'a> {
    /// Creates an empty layering.
    #[must_use]
    pub fn new() -> Self {
        Layered {
            sources: Vec::new(),
        }
    }

    /// Adds a source that overrides every source added before it.
    #[must_use]
    pub fn with(mut self, source: &'a dyn ValueSource) -> Self {
        self.sources.push(source);
        self
    }

    /// Returns the layered sources in priority order.
    #[must_use]
    pub fn sources(&self) -> &[&'a dyn ValueSource] {
        &self.sources
    }
}

impl ValueSource for Layered<'_> {
    fn resolve(&self, column: &str) -> Option<Value> {
        self.sources.iter().rev().find_map(|s| s.resolve(column))
    }
}
