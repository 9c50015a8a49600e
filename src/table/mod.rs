//! Table metadata and statement generation.
//!
//! [`TableMetadata`] validates a table description once. The [`builder`]
//! functions derive CQL statements from it, and [`Table`] caches the
//! unfiltered ones.

pub mod builder;
mod crud;
mod metadata;

pub use builder::{Statement, StatementKind};
pub use crud::Table;
pub use metadata::TableMetadata;
