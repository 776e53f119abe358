//! Error types for Wellspring
//!
//! Only caller mistakes and I/O-like failures are errors. Pairs that lack
//! enough data for a correlation are reported by omission, never through
//! this type.

use crate::types::FactorId;
use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur while preparing or running an analysis
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Unknown wellbeing metric: {0}")]
    UnknownMetric(String),

    #[error("Unknown behavioral factor: {0}")]
    UnknownFactor(FactorId),

    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid entry: {0}")]
    InvalidEntry(String),

    /// Returned by [`EntryStore`](crate::store::EntryStore) implementations
    /// when the backing data source cannot be read
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl AnalysisError {
    /// Whether the error was caused by the request rather than the data source
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            AnalysisError::UnknownMetric(_)
                | AnalysisError::UnknownFactor(_)
                | AnalysisError::InvalidDateRange { .. }
                | AnalysisError::InvalidConfig(_)
        )
    }
}
