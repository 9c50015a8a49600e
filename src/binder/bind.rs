//! Placeholder resolution.

use std::collections::HashSet;

use tracing::trace;

use super::ValueSource;
use crate::error::{CqlxError, Result};
use crate::types::{DataType, Value};

/// Resolves an ordered placeholder list against value sources.
///
/// Binding only reads its sources. Every call is independent of the previous one.
#[derive(Debug, Clone, Copy)]
pub struct Binder<'a> {
    placeholders: &'a [String],
    types: Option<&'a [DataType]>,
}

impl<'a> Binder<'a> {
    /// Creates a binder for the given placeholder names.
    #[must_use]
    pub fn new(placeholders: &'a [String]) -> Self {
        Binder {
            placeholders,
            types: None,
        }
    }

    /// Coerces every resolved value to the prepared parameter types.
    #[must_use]
    pub fn with_types(mut self, types: &'a [DataType]) -> Self {
        self.types = Some(types);
        self
    }

    /// Returns the placeholder names.
    #[must_use]
    pub fn placeholders(&self) -> &'a [String] {
        self.placeholders
    }

    /// Resolves every placeholder, searching `sources` from last to first.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `MalformedPlaceholderList` if a name repeats or the type list has a different length
    /// - `MissingBinding` if no source resolves a placeholder
    /// - `TypeMismatch` if a value cannot be coerced to its parameter type
    pub fn bind(&self, sources: &[&dyn ValueSource]) -> Result<Vec<Value>> {
        self.check_placeholders()?;

        let mut values = Vec::with_capacity(self.placeholders.len());
        for (i, column) in self.placeholders.iter().enumerate() {
            let value = sources
                .iter()
                .rev()
                .find_map(|s| s.resolve(column))
                .ok_or_else(|| CqlxError::MissingBinding {
                    column: column.clone(),
                })?;

            let value = match self.types.map(|t| t[i]) {
                Some(expected) => {
                    let actual = value.type_name();
                    value.coerce(expected).ok_or_else(|| {
                        CqlxError::type_mismatch(column.as_str(), expected.name(), actual)
                    })?
                }
                None => value,
            };
            values.push(value);
        }

        trace!(placeholders = values.len(), sources = sources.len(), "bound values");
        Ok(values)
    }

    fn check_placeholders(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.placeholders.len());
        for name in self.placeholders {
            if !seen.insert(name.to_ascii_lowercase()) {
                return Err(CqlxError::MalformedPlaceholderList(format!(
                    "duplicate placeholder '{name}'"
                )));
            }
        }
        if let Some(types) = self.types {
            if types.len() != self.placeholders.len() {
                return Err(CqlxError::MalformedPlaceholderList(format!(
                    "{} placeholders but {} parameter types",
                    self.placeholders.len(),
                    types.len()
                )));
            }
        }
        Ok(())
    }
}

/// Resolves `placeholders` against `sources`; later sources win.
///
/// # Errors
///
/// See [`Binder::bind`].
pub fn bind(placeholders: &[String], sources: &[&dyn ValueSource]) -> Result<Vec<Value>> {
    Binder::new(placeholders).bind(sources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::ValueMap;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    fn map(entries: &[(&str, Value)]) -> ValueMap {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_bind_in_placeholder_order() {
        let m = map(&[("b", Value::Int(2)), ("a", Value::Int(1))]);
        let values = bind(&names(&["a", "b"]), &[&m]).unwrap();
        assert_eq!(values, vec![Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn test_missing_binding_names_column() {
        let m = map(&[("a", Value::Int(1))]);
        let err = bind(&names(&["a", "b"]), &[&m]).unwrap_err();
        assert!(matches!(err, CqlxError::MissingBinding { ref column } if column == "b"));
        assert!(err.is_binding_error());
    }

    #[test]
    fn test_duplicate_placeholder_rejected() {
        let m = map(&[("a", Value::Int(1))]);
        let err = bind(&names(&["a", "A"]), &[&m]).unwrap_err();
        assert!(matches!(err, CqlxError::MalformedPlaceholderList(_)));
    }

    #[test]
    fn test_later_source_overrides_per_placeholder() {
        let first = map(&[("a", Value::Int(1)), ("b", Value::Int(2))]);
        let second = map(&[("b", Value::Int(20))]);
        let values = bind(&names(&["a", "b"]), &[&first, &second]).unwrap();
        assert_eq!(values, vec![Value::Int(1), Value::Int(20)]);
    }

    #[test]
    fn test_typed_bind_rejects_unrepresentable_value() {
        let m = map(&[("age", Value::Text("ten".into()))]);
        let placeholders = names(&["age"]);
        let err = Binder::new(&placeholders)
            .with_types(&[DataType::Int])
            .bind(&[&m])
            .unwrap_err();
        match err {
            CqlxError::TypeMismatch { column, expected, actual } => {
                assert_eq!(column, "age");
                assert_eq!(expected, "int");
                assert_eq!(actual, "text");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_typed_bind_widens() {
        let m = map(&[("n", Value::Int(3))]);
        let placeholders = names(&["n"]);
        let values = Binder::new(&placeholders)
            .with_types(&[DataType::BigInt])
            .bind(&[&m])
            .unwrap();
        assert_eq!(values, vec![Value::BigInt(3)]);
    }

    #[test]
    fn test_typed_bind_sends_converted_values() {
        let m = map(&[
            ("at", Value::BigInt(1_500_000_000_000)),
            ("tags", Value::List(vec![Value::Text("a".into())])),
            ("ratio", Value::Float(0.5)),
        ]);
        let placeholders = names(&["at", "tags", "ratio"]);
        let values = Binder::new(&placeholders)
            .with_types(&[DataType::Timestamp, DataType::Set, DataType::Double])
            .bind(&[&m])
            .unwrap();
        assert_eq!(
            values,
            vec![
                Value::Timestamp(1_500_000_000_000),
                Value::Set(vec![Value::Text("a".into())]),
                Value::Double(0.5),
            ]
        );
    }

    #[test]
    fn test_keys_differing_only_in_case_do_not_bind() {
        let m = map(&[("Email", Value::Int(1)), ("EMAIL", Value::Int(2))]);
        let err = bind(&names(&["email"]), &[&m]).unwrap_err();
        assert!(matches!(err, CqlxError::MissingBinding { ref column } if column == "email"));

        let fallback = map(&[("email", Value::Int(0))]);
        let values = bind(&names(&["email"]), &[&fallback, &m]).unwrap();
        assert_eq!(values, vec![Value::Int(0)]);
    }

    #[test]
    fn test_empty_placeholder_list_binds_nothing() {
        assert!(bind(&[], &[]).unwrap().is_empty());
    }
}
