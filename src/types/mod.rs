//! Wire values, rows and conversions between them and Rust values.

mod row;
mod value;

pub use row::Row;
pub use value::{Blob, DataType, FromValue, ToValue, Value, ValueTypeError};
