//! Error types for the catalog crate.
//!
//! Parsing platform values (durations, timestamps) is the only fallible
//! work done here; everything else is plain data.

use thiserror::Error;

/// Errors that can occur while interpreting platform values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Duration string was not in the `P[nD]T[nH][nM][nS]` shape
    #[error("Invalid ISO-8601 duration '{value}': {reason}")]
    InvalidDuration { value: String, reason: String },

    /// Timestamp string could not be read as RFC 3339
    #[error("Invalid timestamp '{value}': {reason}")]
    InvalidTimestamp { value: String, reason: String },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, CatalogError>;
