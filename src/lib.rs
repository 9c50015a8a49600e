//! cqlx - CQL statement building and named parameter binding.
//!
//! Describe a table once with [`TableMetadata`], derive its statements with
//! [`Table`], and bind records or maps to the statements' named placeholders:
//!
//! ```
//! use cqlx::{Table, TableMetadata};
//!
//! #[derive(Debug, Default)]
//! struct Person {
//!     first_name: String,
//!     last_name: String,
//!     email: Vec<String>,
//! }
//! cqlx::record!(Person { first_name, last_name, email });
//!
//! let person_table = Table::new(
//!     TableMetadata::new(
//!         "person",
//!         ["first_name", "last_name", "email"],
//!         ["first_name"],
//!         ["last_name"],
//!     )
//!     .unwrap(),
//! );
//!
//! let get = person_table.get();
//! assert_eq!(
//!     get.text(),
//!     "SELECT first_name,last_name,email FROM person WHERE first_name=? AND last_name=?"
//! );
//!
//! let p = Person { first_name: "Patricia".into(), last_name: "Citizen".into(), email: vec![] };
//! let source = cqlx::binder::RecordSource::new(&p).unwrap();
//! let values = cqlx::binder::bind(get.names(), &[&source]).unwrap();
//! assert_eq!(values.len(), 2);
//! ```
//!
//! Preparing and executing go through a driver implementing [`Session`].

pub mod binder;
pub mod error;
mod macros;
pub mod mapper;
pub mod query;
pub mod table;
pub mod types;

pub use binder::{Binder, Layered, RecordSource, ValueMap, ValueSource};
pub use error::{CqlxError, DriverError, Result};
pub use mapper::{mapping_for, FieldDef, Fields, Mapping, Record};
pub use query::{compile_named_query, Query, QueryConfig, Session, SingleRow};
pub use table::{Statement, StatementKind, Table, TableMetadata};
pub use types::{Row, Value};
