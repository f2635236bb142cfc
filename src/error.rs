//! Error types for u-eda.

use thiserror::Error;

/// All errors produced by u-eda operations.
#[derive(Debug, Error)]
pub enum EdaError {
    /// CSV input could not be read into a table.
    #[error("CSV parse error at line {line}: {message}")]
    CsvParse { line: usize, message: String },

    /// Column not found in DataFrame.
    #[error("column '{name}' not found")]
    ColumnNotFound { name: String },

    /// Column is not numeric where numeric data is required.
    #[error("column '{column}' is not numeric")]
    NonNumericColumn { column: String },

    /// Column length does not match the table's row count.
    #[error("expected {expected} elements, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Insufficient data for the requested operation.
    #[error("need at least {min_required} values, got {actual}")]
    InsufficientData { min_required: usize, actual: usize },

    /// A figure could not be drawn or written.
    #[error("plot error: {0}")]
    Plot(String),

    /// I/O error while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<csv::Error> for EdaError {
    fn from(e: csv::Error) -> Self {
        let line = e
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or_default();
        Self::CsvParse {
            line,
            message: e.to_string(),
        }
    }
}
