//! Core error types for costlens.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Core error type for costlens operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A required column is missing from an input table.
    #[error("Missing required column: {column}")]
    Schema {
        /// Name of the missing column.
        column: String,
    },

    /// A date interval is empty or reversed.
    #[error("Invalid date range: start {start} must be before end {end}")]
    InvalidDateRange {
        /// Interval start.
        start: NaiveDate,
        /// Interval end (exclusive).
        end: NaiveDate,
    },

    /// A cell could not be parsed into its column type.
    #[error("Invalid value in row {row}, column {column}: {message}")]
    InvalidValue {
        /// Zero-based row position in the input.
        row: usize,
        /// Column name.
        column: String,
        /// What went wrong.
        message: String,
    },

    /// An amount is larger than any bill can be.
    #[error("Amount out of range: {amount}")]
    AmountOutOfRange {
        /// The rejected amount.
        amount: Decimal,
    },

    /// A report selector matched no rows.
    #[error("No rows selected")]
    EmptySelection,

    /// Invalid input that is not tied to a single cell.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CoreError {
    /// Creates a schema error for a missing column.
    pub fn missing_column(column: impl Into<String>) -> Self {
        Self::Schema {
            column: column.into(),
        }
    }

    /// Returns true if this error was caused by the shape of the input table.
    pub fn is_schema_error(&self) -> bool {
        matches!(self, Self::Schema { .. })
    }
}
