//! Binder module for named parameter resolution.
//!
//! The binder turns an ordered placeholder list into an ordered value list by
//! looking each name up in one or more value sources:
//! - A record, read through its column mapping
//! - A map keyed by column name
//! - A layering of both, where later sources override earlier ones

mod bind;
mod source;

pub use bind::{bind, Binder};
pub use source::{Layered, RecordSource, ValueMap, ValueSource};
