//! Value and `DataType` definitions for cqlx.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Wire types a bind marker can be prepared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// Boolean.
    Boolean,
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    BigInt,
    /// 32-bit floating point.
    Float,
    /// 64-bit floating point.
    Double,
    /// UTF-8 string (`text`, `varchar`, `ascii`).
    Text,
    /// Arbitrary bytes.
    Blob,
    /// UUID.
    Uuid,
    /// Timestamp (milliseconds since epoch).
    Timestamp,
    /// Ordered collection.
    List,
    /// Unique collection.
    Set,
    /// Key-value collection.
    Map,
}

impl DataType {
    /// Returns the name of the data type as used in CQL.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Boolean => "boolean",
            DataType::Int => "int",
            DataType::BigInt => "bigint",
            DataType::Float => "float",
            DataType::Double => "double",
            DataType::Text => "text",
            DataType::Blob => "blob",
            DataType::Uuid => "uuid",
            DataType::Timestamp => "timestamp",
            DataType::List => "list",
            DataType::Set => "set",
            DataType::Map => "map",
        }
    }

    /// Parses a CQL type name, ignoring collection element types.
    ///
    /// Returns None for unsupported types.
    #[must_use]
    pub fn from_cql(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        let base = name.split('<').next().unwrap_or("").trim();
        match base {
            "boolean" => Some(DataType::Boolean),
            "int" => Some(DataType::Int),
            "bigint" | "counter" => Some(DataType::BigInt),
            "float" => Some(DataType::Float),
            "double" => Some(DataType::Double),
            "text" | "varchar" | "ascii" => Some(DataType::Text),
            "blob" => Some(DataType::Blob),
            "uuid" | "timeuuid" => Some(DataType::Uuid),
            "timestamp" => Some(DataType::Timestamp),
            "list" => Some(DataType::List),
            "set" => Some(DataType::Set),
            "map" => Some(DataType::Map),
            _ => None,
        }
    }

    /// Returns whether this type is a collection.
    #[must_use]
    pub fn is_collection(&self) -> bool {
        matches!(self, DataType::List | DataType::Set | DataType::Map)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Runtime value container for bound parameters and row cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Boolean value.
    Boolean(bool),
    /// 32-bit signed integer value.
    Int(i32),
    /// 64-bit signed integer value.
    BigInt(i64),
    /// 32-bit floating point value.
    Float(f32),
    /// 64-bit floating point value.
    Double(f64),
    /// String value.
    Text(String),
    /// Byte string value.
    Blob(Vec<u8>),
    /// UUID value.
    Uuid(Uuid),
    /// Timestamp value (milliseconds since Unix epoch).
    Timestamp(i64),
    /// List value.
    List(Vec<Value>),
    /// Set value, kept in insertion order.
    Set(Vec<Value>),
    /// Map value, kept in insertion order.
    Map(Vec<(Value, Value)>),
    /// Null value.
    Null,
}

impl Value {
    /// Returns true if this value is null.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the data type of this value, or None for Null.
    #[must_use]
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Boolean(_) => Some(DataType::Boolean),
            Value::Int(_) => Some(DataType::Int),
            Value::BigInt(_) => Some(DataType::BigInt),
            Value::Float(_) => Some(DataType::Float),
            Value::Double(_) => Some(DataType::Double),
            Value::Text(_) => Some(DataType::Text),
            Value::Blob(_) => Some(DataType::Blob),
            Value::Uuid(_) => Some(DataType::Uuid),
            Value::Timestamp(_) => Some(DataType::Timestamp),
            Value::List(_) => Some(DataType::List),
            Value::Set(_) => Some(DataType::Set),
            Value::Map(_) => Some(DataType::Map),
            Value::Null => None,
        }
    }

    /// Returns the type name used in diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.data_type().map_or("null", |t| t.name())
    }

    /// Returns whether this value can be sent as a parameter of the given type.
    ///
    /// Agrees with [`Value::coerce`]: true exactly when coercion succeeds.
    #[must_use]
    pub fn fits(&self, target: DataType) -> bool {
        match (self, target) {
            (Value::Null, _)
            | (Value::Int(_), DataType::BigInt | DataType::Timestamp)
            | (Value::BigInt(_), DataType::Timestamp)
            | (Value::Timestamp(_), DataType::BigInt)
            | (Value::Float(_), DataType::Double)
            | (Value::List(_), DataType::Set)
            | (Value::Set(_), DataType::List) => true,
            (Value::List(items) | Value::Set(items), DataType::Map) => items.is_empty(),
            (value, target) => value.data_type() == Some(target),
        }
    }

    /// Converts this value to the wire representation of `target`.
    ///
    /// Null passes through. Integers and floats widen, never narrow. `bigint`
    /// and `timestamp` share a representation. Lists and sets convert into each
    /// other, and an empty one becomes an empty map. Returns None when the value
    /// cannot be represented as `target`.
    #[must_use]
    pub fn coerce(self, target: DataType) -> Option<Value> {
        match (self, target) {
            (Value::Null, _) => Some(Value::Null),
            (Value::Int(v), DataType::BigInt) => Some(Value::BigInt(i64::from(v))),
            (Value::Int(v), DataType::Timestamp) => Some(Value::Timestamp(i64::from(v))),
            (Value::BigInt(v), DataType::Timestamp) => Some(Value::Timestamp(v)),
            (Value::Timestamp(v), DataType::BigInt) => Some(Value::BigInt(v)),
            (Value::Float(v), DataType::Double) => Some(Value::Double(f64::from(v))),
            (Value::List(items), DataType::Set) => Some(Value::Set(items)),
            (Value::Set(items), DataType::List) => Some(Value::List(items)),
            (Value::List(items) | Value::Set(items), DataType::Map) if items.is_empty() => {
                Some(Value::Map(Vec::new()))
            }
            (value, target) if value.data_type() == Some(target) => Some(value),
            _ => None,
        }
    }

    /// Attempts to extract a string reference.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Attempts to extract an i64 value, widening `Int`.
    #[must_use]
    pub fn as_bigint(&self) -> Option<i64> {
        match self {
            Value::BigInt(i) => Some(*i),
            Value::Int(i) => Some(i64::from(*i)),
            _ => None,
        }
    }

    /// Attempts to extract a bool value.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::BigInt(i) | Value::Timestamp(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Value::Blob(bytes) => {
                f.write_str("0x")?;
                for b in bytes {
                    write!(f, "{b:02x}")?;
                }
                Ok(())
            }
            Value::Uuid(u) => write!(f, "{u}"),
            Value::List(items) => write_seq(f, '[', items, ']'),
            Value::Set(items) => write_seq(f, '{', items, '}'),
            Value::Map(entries) => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            }
            Value::Null => f.write_str("null"),
        }
    }
}

fn write_seq(f: &mut fmt::Formatter<'_>, open: char, items: &[Value], close: char) -> fmt::Result {
    write!(f, "{open}")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    write!(f, "{close}")
}

/// A value that could not be converted to the requested Rust type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueTypeError {
    /// Type the conversion expected.
    pub expected: String,
    /// Type of the value actually supplied.
    pub actual: String,
}

impl ValueTypeError {
    /// Creates an error for `value` not being convertible to `expected`.
    #[must_use]
    pub fn new(expected: impl Into<String>, value: &Value) -> Self {
        ValueTypeError {
            expected: expected.into(),
            actual: value.type_name().to_string(),
        }
    }

    /// Attaches the column name, producing a crate error.
    #[must_use]
    pub fn for_column(self, column: &str) -> crate::CqlxError {
        crate::CqlxError::type_mismatch(column, self.expected, self.actual)
    }
}

/// Conversion of a Rust value into a wire value.
pub trait ToValue {
    /// Converts `self` to a [`Value`].
    fn to_value(&self) -> Value;
}

/// Conversion of a wire value into a Rust value.
pub trait FromValue: Sized {
    /// Converts a [`Value`] into `Self`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value's type cannot represent `Self`.
    fn from_value(value: Value) -> std::result::Result<Self, ValueTypeError>;
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> std::result::Result<Self, ValueTypeError> {
        Ok(value)
    }
}

macro_rules! scalar_value {
    ($ty:ty, $variant:ident, $name:literal) => {
        impl ToValue for $ty {
            fn to_value(&self) -> Value {
                Value::$variant(self.clone())
            }
        }

        impl FromValue for $ty {
            fn from_value(value: Value) -> std::result::Result<Self, ValueTypeError> {
                match value {
                    Value::$variant(v) => Ok(v),
                    other => Err(ValueTypeError::new($name, &other)),
                }
            }
        }
    };
}

scalar_value!(bool, Boolean, "boolean");
scalar_value!(i32, Int, "int");
scalar_value!(f32, Float, "float");
scalar_value!(String, Text, "text");
scalar_value!(Uuid, Uuid, "uuid");

impl ToValue for i64 {
    fn to_value(&self) -> Value {
        Value::BigInt(*self)
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> std::result::Result<Self, ValueTypeError> {
        match value {
            Value::BigInt(v) | Value::Timestamp(v) => Ok(v),
            Value::Int(v) => Ok(i64::from(v)),
            other => Err(ValueTypeError::new("bigint", &other)),
        }
    }
}

impl ToValue for f64 {
    fn to_value(&self) -> Value {
        Value::Double(*self)
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> std::result::Result<Self, ValueTypeError> {
        match value {
            Value::Double(v) => Ok(v),
            Value::Float(v) => Ok(f64::from(v)),
            other => Err(ValueTypeError::new("double", &other)),
        }
    }
}

impl ToValue for &str {
    fn to_value(&self) -> Value {
        Value::Text((*self).to_string())
    }
}

impl ToValue for DateTime<Utc> {
    fn to_value(&self) -> Value {
        Value::Timestamp(self.timestamp_millis())
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: Value) -> std::result::Result<Self, ValueTypeError> {
        match value {
            Value::Timestamp(ms) => Utc
                .timestamp_millis_opt(ms)
                .single()
                .ok_or_else(|| ValueTypeError::new("timestamp", &Value::Timestamp(ms))),
            other => Err(ValueTypeError::new("timestamp", &other)),
        }
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, ToValue::to_value)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> std::result::Result<Self, ValueTypeError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

// `Vec<u8>` would collide with the generic list impl, so blobs go through a newtype.
/// Byte string bound as a CQL `blob`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Blob(pub Vec<u8>);

impl ToValue for Blob {
    fn to_value(&self) -> Value {
        Value::Blob(self.0.clone())
    }
}

impl FromValue for Blob {
    fn from_value(value: Value) -> std::result::Result<Self, ValueTypeError> {
        match value {
            Value::Blob(bytes) => Ok(Blob(bytes)),
            Value::Null => Ok(Blob::default()),
            other => Err(ValueTypeError::new("blob", &other)),
        }
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(ToValue::to_value).collect())
    }
}

// Empty collections travel as null.
impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> std::result::Result<Self, ValueTypeError> {
        match value {
            Value::Null => Ok(Vec::new()),
            Value::List(items) | Value::Set(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(ValueTypeError::new("list", &other)),
        }
    }
}

impl<T: ToValue> ToValue for BTreeSet<T> {
    fn to_value(&self) -> Value {
        Value::Set(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: FromValue + Ord> FromValue for BTreeSet<T> {
    fn from_value(value: Value) -> std::result::Result<Self, ValueTypeError> {
        match value {
            Value::Null => Ok(BTreeSet::new()),
            Value::Set(items) | Value::List(items) => {
                items.into_iter().map(T::from_value).collect()
            }
            other => Err(ValueTypeError::new("set", &other)),
        }
    }
}

impl<K: ToValue, V: ToValue> ToValue for BTreeMap<K, V> {
    fn to_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(k, v)| (k.to_value(), v.to_value()))
                .collect(),
        )
    }
}

impl<K: FromValue + Ord, V: FromValue> FromValue for BTreeMap<K, V> {
    fn from_value(value: Value) -> std::result::Result<Self, ValueTypeError> {
        match value {
            Value::Null => Ok(BTreeMap::new()),
            Value::Map(entries) => entries
                .into_iter()
                .map(|(k, v)| Ok((K::from_value(k)?, V::from_value(v)?)))
                .collect(),
            other => Err(ValueTypeError::new("map", &other)),
        }
    }
}
