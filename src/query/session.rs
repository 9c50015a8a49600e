//! Interface to the external driver.

use crate::error::DriverError;
use crate::types::{DataType, Row, Value};

/// Lazy, single-pass sequence of result rows.
pub type Rows<'a> = Box<dyn Iterator<Item = std::result::Result<Row, DriverError>> + 'a>;

/// A driver session able to prepare and execute statements.
///
/// Implementations own connection handling, paging, retries and timeouts.
/// Calls are synchronous from the caller's point of view.
pub trait Session {
    /// Opaque prepared statement handle.
    type Prepared;

    /// Prepares statement text.
    ///
    /// # Errors
    ///
    /// Returns the driver's error if the statement cannot be prepared.
    fn prepare(&self, statement: &str) -> std::result::Result<Self::Prepared, DriverError>;

    /// Executes a prepared statement with positional values.
    ///
    /// # Errors
    ///
    /// Returns the driver's error if execution fails.
    fn execute<'a>(
        &'a self,
        prepared: &Self::Prepared,
        values: &[Value],
    ) -> std::result::Result<Rows<'a>, DriverError>;

    /// Returns the bind marker types of a prepared statement, if known.
    fn param_types(&self, _prepared: &Self::Prepared) -> Option<Vec<DataType>> {
        None
    }

    /// Releases a prepared statement handle.
    fn release(&self, _prepared: Self::Prepared) {}
}
