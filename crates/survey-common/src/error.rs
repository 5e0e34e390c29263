//! Error types for survey heatmap processing.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using SurveyError.
pub type SurveyResult<T> = Result<T, SurveyError>;

/// Primary error type for loading and validating survey data.
///
/// Only `NoData` and `MissingBaseRaster` abort a run. The remaining
/// variants describe recoverable conditions that callers log and skip.
#[derive(Debug, Error)]
pub enum SurveyError {
    // === Input Errors ===
    #[error("Source table not found: {}", path.display())]
    MissingSource { path: PathBuf },

    #[error("Base raster not found: {}", path.display())]
    MissingBaseRaster { path: PathBuf },

    #[error("Invalid record at {}:{line}: {reason}", path.display())]
    InvalidRecord {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    #[error("Source {} is missing mapped column '{column}'", path.display())]
    Schema { path: PathBuf, column: String },

    #[error("No source table could be loaded ({attempted} attempted)")]
    NoData { attempted: usize },

    // === Grid Errors ===
    #[error("Invalid grid parameter '{param}': {message}")]
    InvalidGrid { param: String, message: String },

    #[error("Unknown value field: {0}")]
    UnknownValueField(String),

    // === Infrastructure Errors ===
    #[error("CSV error: {0}")]
    Csv(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl SurveyError {
    /// Whether processing may continue with a reduced dataset.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SurveyError::MissingSource { .. }
                | SurveyError::InvalidRecord { .. }
                | SurveyError::Schema { .. }
                | SurveyError::Csv(_)
        )
    }
}

impl From<std::io::Error> for SurveyError {
    fn from(err: std::io::Error) -> Self {
        SurveyError::Io(err.to_string())
    }
}
