//! Error types for the data-loader crate.
//!
//! Every failure while reading the movie dataset ends up as a
//! `DataLoadError`. The `#[derive(Error)]` macro from thiserror gives us
//! `Display` and `std::error::Error` from the `#[error(...)]` attributes.

use thiserror::Error;

/// Errors that can occur during data loading and parsing
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The CSV reader rejected a row (bad quoting, wrong type in a numeric cell, ...)
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A cell could not be parsed
    ///
    /// `line` is the 1-based line in the source file, counting the header.
    #[error("Parse error at line {line} in column {column}: {reason}")]
    ParseError {
        line: usize,
        column: String,
        reason: String,
    },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Data validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
