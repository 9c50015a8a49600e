//! Prepared statement coupled with its placeholder list.

use tracing::{debug, trace};

use super::decode::{decode_new, decode_with};
use super::{QueryConfig, Rows, Session, SingleRow};
use crate::binder::{Binder, RecordSource, ValueSource};
use crate::error::{CqlxError, Result};
use crate::mapper::{mapping_for, Record};
use crate::table::Statement;
use crate::types::{DataType, Row, Value};

/// A prepared statement that binds named values and decodes rows into records.
///
/// Each bind call replaces the previous bound values. The prepared handle is
/// released exactly once: by [`Query::release`], by one of the `*_release`
/// helpers, or when the query is dropped. A `Query` is not meant to be shared
/// between concurrent callers.
pub struct Query<'s, S: Session> {
    session: &'s S,
    prepared: Option<S::Prepared>,
    statement: String,
    names: Vec<String>,
    types: Option<Vec<DataType>>,
    values: Option<Vec<Value>>,
    config: QueryConfig,
}

impl<'s, S: Session> Query<'s, S> {
    /// Wraps an already prepared handle and its placeholder list.
    #[must_use]
    pub fn new(
        session: &'s S,
        prepared: S::Prepared,
        statement: impl Into<String>,
        names: Vec<String>,
    ) -> Self {
        let types = session.param_types(&prepared);
        Query {
            session,
            prepared: Some(prepared),
            statement: statement.into(),
            names,
            types,
            values: None,
            config: QueryConfig::default(),
        }
    }

    /// Prepares a statement and wraps the handle.
    ///
    /// # Errors
    ///
    /// Returns `PrepareError` if the driver rejects the statement.
    pub fn prepare(session: &'s S, statement: &Statement) -> Result<Self> {
        let prepared = session
            .prepare(statement.text())
            .map_err(|source| CqlxError::PrepareError {
                statement: statement.text().to_string(),
                source,
            })?;
        debug!(statement = statement.text(), "prepared statement");
        Ok(Self::new(
            session,
            prepared,
            statement.text(),
            statement.names().to_vec(),
        ))
    }

    /// Replaces the query configuration.
    #[must_use]
    pub fn with_config(mut self, config: QueryConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the statement text.
    #[must_use]
    pub fn statement(&self) -> &str {
        &self.statement
    }

    /// Returns the placeholder list.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Returns the current bound values, if any bind succeeded.
    #[must_use]
    pub fn values(&self) -> Option<&[Value]> {
        self.values.as_deref()
    }

    /// Returns true once the prepared handle has been released.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.prepared.is_none()
    }

    fn handle(&self) -> Result<&S::Prepared> {
        self.prepared.as_ref().ok_or(CqlxError::QueryReleased)
    }

    /// Binds values from sources searched last to first.
    ///
    /// On failure the previous bound values are cleared.
    ///
    /// # Errors
    ///
    /// Returns `QueryReleased` or any binding error.
    pub fn bind_sources(&mut self, sources: &[&dyn ValueSource]) -> Result<&mut Self> {
        self.handle()?;
        self.values = None;

        let mut binder = Binder::new(&self.names);
        if let Some(types) = &self.types {
            binder = binder.with_types(types);
        }
        self.values = Some(binder.bind(sources)?);
        Ok(self)
    }

    /// Binds values from a record's mapped fields.
    ///
    /// # Errors
    ///
    /// Returns `QueryReleased` or any mapping or binding error.
    pub fn bind_record<T: Record>(&mut self, record: &T) -> Result<&mut Self> {
        let source = RecordSource::new(record)?;
        self.bind_sources(&[&source])
    }

    /// Binds values from a map keyed by column name.
    ///
    /// # Errors
    ///
    /// Returns `QueryReleased` or any binding error.
    pub fn bind_map(&mut self, map: &dyn ValueSource) -> Result<&mut Self> {
        self.bind_sources(&[map])
    }

    /// Binds values from a record, with entries of `map` taking precedence.
    ///
    /// # Errors
    ///
    /// Returns `QueryReleased` or any mapping or binding error.
    pub fn bind_record_map<T: Record>(
        &mut self,
        record: &T,
        map: &dyn ValueSource,
    ) -> Result<&mut Self> {
        let source = RecordSource::new(record)?;
        self.bind_sources(&[&source, map])
    }

    fn run(&self) -> Result<Rows<'s>> {
        let prepared = self.handle()?;
        let values: &[Value] = match &self.values {
            Some(values) => values,
            None if self.names.is_empty() => &[],
            None => {
                return Err(CqlxError::MissingBinding {
                    column: self.names[0].clone(),
                })
            }
        };

        trace!(statement = %self.statement, values = values.len(), "executing");
        self.session
            .execute(prepared, values)
            .map_err(|source| self.execution_error(source))
    }

    fn execution_error(&self, source: crate::error::DriverError) -> CqlxError {
        CqlxError::ExecutionError {
            statement: self.statement.clone(),
            source,
        }
    }

    fn next_row(&self, rows: &mut Rows<'s>) -> Result<Option<Row>> {
        rows.next()
            .transpose()
            .map_err(|source| self.execution_error(source))
    }

    /// Executes the statement and discards any rows.
    ///
    /// # Errors
    ///
    /// Returns `QueryReleased`, `MissingBinding` if nothing was bound, or
    /// `ExecutionError` from the driver.
    pub fn exec(&self) -> Result<()> {
        self.run().map(drop)
    }

    /// Executes the statement and returns the raw rows.
    ///
    /// # Errors
    ///
    /// Same as [`Query::exec`].
    pub fn rows(&self) -> Result<Rows<'s>> {
        self.run()
    }

    /// Executes and decodes exactly one row into `dest`.
    ///
    /// Fields whose column is not in the row keep their value. `dest` is only
    /// written when the whole row decodes.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for zero rows, `MultipleRows` for more than one in
    /// strict mode, plus any execution or decoding error.
    pub fn fetch_one_into<T: Record + Default>(&self, dest: &mut T) -> Result<()> {
        let mapping = mapping_for::<T>()?;
        let mut rows = self.run()?;

        let row = self.next_row(&mut rows)?.ok_or_else(|| CqlxError::NotFound {
            statement: self.statement.clone(),
        })?;
        if self.config.single_row == SingleRow::Strict && self.next_row(&mut rows)?.is_some() {
            return Err(CqlxError::MultipleRows {
                statement: self.statement.clone(),
            });
        }

        decode_with(&mapping, row, dest, self.config.strict_decode)
    }

    /// Executes and decodes exactly one row into a new record.
    ///
    /// # Errors
    ///
    /// Same as [`Query::fetch_one_into`].
    pub fn fetch_one<T: Record + Default>(&self) -> Result<T> {
        let mut dest = T::default();
        self.fetch_one_into(&mut dest)?;
        Ok(dest)
    }

    /// Executes and appends one decoded record per row to `dest`.
    ///
    /// # Errors
    ///
    /// Returns any execution or decoding error. Records decoded before the
    /// failure stay in `dest`.
    pub fn fetch_all_into<T: Record + Default>(&self, dest: &mut Vec<T>) -> Result<()> {
        let mapping = mapping_for::<T>()?;
        let mut rows = self.run()?;

        while let Some(row) = self.next_row(&mut rows)? {
            dest.push(decode_new(&mapping, row, self.config.strict_decode)?);
        }
        Ok(())
    }

    /// Executes and decodes every row.
    ///
    /// # Errors
    ///
    /// Same as [`Query::fetch_all_into`].
    pub fn fetch_all<T: Record + Default>(&self) -> Result<Vec<T>> {
        let mut dest = Vec::new();
        self.fetch_all_into(&mut dest)?;
        Ok(dest)
    }

    /// Releases the prepared handle. Calling it again does nothing.
    pub fn release(&mut self) {
        if let Some(prepared) = self.prepared.take() {
            debug!(statement = %self.statement, "releasing prepared statement");
            self.values = None;
            self.session.release(prepared);
        }
    }

    /// Executes, then releases whatever the outcome.
    ///
    /// # Errors
    ///
    /// Same as [`Query::exec`].
    pub fn exec_release(mut self) -> Result<()> {
        let result = self.exec();
        self.release();
        result
    }

    /// Fetches one row into `dest`, then releases whatever the outcome.
    ///
    /// # Errors
    ///
    /// Same as [`Query::fetch_one_into`].
    pub fn fetch_one_release<T: Record + Default>(mut self, dest: &mut T) -> Result<()> {
        let result = self.fetch_one_into(dest);
        self.release();
        result
    }

    /// Fetches all rows into `dest`, then releases whatever the outcome.
    ///
    /// # Errors
    ///
    /// Same as [`Query::fetch_all_into`].
    pub fn fetch_all_release<T: Record + Default>(mut self, dest: &mut Vec<T>) -> Result<()> {
        let result = self.fetch_all_into(dest);
        self.release();
        result
    }
}

impl<S: Session> Drop for Query<'_, S> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<S: Session> std::fmt::Debug for Query<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Query")
            .field("statement", &self.statement)
            .field("names", &self.names)
            .field("values", &self.values)
            .field("released", &self.is_released())
            .finish()
    }
}
