//! Errors raised by tables, models and the evaluation harness.

/// Errors from fitting, predicting and table manipulation.
#[derive(Debug, thiserror::Error)]
pub enum RegressionError {
    /// A hyperparameter is outside its admissible range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Paired rows or vectors disagree in length.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// A row, column or feature index is past the end of its container.
    #[error("{what} index {index} is out of range (length {len})")]
    IndexOutOfRange {
        /// The kind of index that was out of range.
        what: &'static str,
        /// The offending index.
        index: usize,
        /// The length of the indexed container.
        len: usize,
    },

    /// A table cell could not be parsed as a number.
    #[error("value {value:?} at row {row}, column {column} is not a number")]
    InvalidValue {
        /// Zero-based data row (header excluded).
        row: usize,
        /// Zero-based source column.
        column: usize,
        /// The raw cell contents.
        value: String,
    },

    /// Reading a CSV source failed.
    #[error("failed to read table")]
    Csv(#[from] csv::Error),
}
