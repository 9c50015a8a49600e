//! Query configuration.

/// Behaviour of single-row fetches when more rows arrive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SingleRow {
    /// A second row fails with `MultipleRows`.
    #[default]
    Strict,
    /// The first row is taken and the rest ignored.
    First,
}

/// Configuration for a bindable query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryConfig {
    /// Fail when a returned column has no destination field (default: true).
    pub strict_decode: bool,
    /// Single-row fetch behaviour (default: strict).
    pub single_row: SingleRow,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            strict_decode: true,
            single_row: SingleRow::Strict,
        }
    }
}

impl QueryConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether unmapped result columns are an error.
    #[must_use]
    pub fn with_strict_decode(mut self, strict: bool) -> Self {
        self.strict_decode = strict;
        self
    }

    /// Sets single-row fetch behaviour.
    #[must_use]
    pub fn with_single_row(mut self, mode: SingleRow) -> Self {
        self.single_row = mode;
        self
    }
}
