//! Bindable queries over an external driver session.

mod bindable;
mod config;
mod decode;
mod named;
mod session;

pub use bindable::Query;
pub use config::{QueryConfig, SingleRow};
pub use decode::decode_row;
pub use named::compile_named_query;
pub use session::{Rows, Session};
