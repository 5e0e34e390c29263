//! Pipeline error type.

use field_estimator::EstimatorError;
use renderer::RenderError;
use survey_common::{SurveyError, ValueField};
use thiserror::Error;

/// Errors that abort a heatmap run before any output is written.
#[derive(Debug, Error)]
pub enum HeatmapError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Survey(#[from] SurveyError),

    #[error(transparent)]
    Estimator(#[from] EstimatorError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("No usable {value_field} measurements in {sources} loaded source(s)")]
    EmptyDataset { value_field: ValueField, sources: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using HeatmapError.
pub type Result<T> = std::result::Result<T, HeatmapError>;
