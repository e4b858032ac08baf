//! Error types for the benefit engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every condition that aborts a run. Recoverable problems (a rate that
//! cannot be parsed, a missing working-days value) are not errors: they are
//! recorded as [`RunWarning`](crate::models::RunWarning)s and the run goes on.

use thiserror::Error;

/// The main error type for the benefit engine.
///
/// # Example
///
/// ```
/// use benefit_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/calculation.yaml".to_string(),
/// };
/// assert_eq!(
///     error.to_string(),
///     "Configuration file not found: /missing/calculation.yaml"
/// );
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Configuration values are inconsistent (shares, day bounds).
    #[error("Invalid configuration: {message}")]
    ConfigurationError {
        /// A description of the inconsistency.
        message: String,
    },

    /// A column the calculation depends on could not be resolved.
    #[error(
        "Table '{table}' has no {role} column (available columns: {})",
        .available.join(", ")
    )]
    MissingColumn {
        /// The table that was searched.
        table: String,
        /// The semantic role that could not be resolved.
        role: String,
        /// The column names the table actually has.
        available: Vec<String>,
    },

    /// A required source dataset is absent or empty.
    #[error("Source '{table}' is unavailable: {reason}")]
    SourceUnavailable {
        /// The name of the dataset.
        table: String,
        /// Why the dataset cannot be used.
        reason: String,
    },

    /// A source file exists but could not be read as a table.
    #[error("Failed to read source '{path}': {message}")]
    SourceParseError {
        /// The path of the source file.
        path: String,
        /// A description of the read error.
        message: String,
    },

    /// The report could not be written.
    #[error("Failed to write report: {message}")]
    ReportWriteError {
        /// A description of the write error.
        message: String,
    },

    /// A monetary amount exceeded the decimal range.
    #[error("Amount overflow while computing {context}")]
    AmountOverflow {
        /// The computation that overflowed.
        context: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
