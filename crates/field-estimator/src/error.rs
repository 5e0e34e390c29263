//! Error types for field estimation.

use thiserror::Error;

/// Errors that can occur while estimating a field.
///
/// Too few usable points is not an error: estimators report it as an
/// [`EstimateWarning`](crate::EstimateWarning) alongside an all-undefined
/// field.
#[derive(Error, Debug)]
pub enum EstimatorError {
    /// A parameter is outside its valid range.
    #[error("invalid estimator parameter '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    /// Unknown interpolation method name.
    #[error("unknown interpolation method: {0}")]
    UnknownMethod(String),

    /// The produced field does not match the grid.
    #[error("field shape mismatch: expected {expected} cells, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },
}

impl EstimatorError {
    /// Create an InvalidParameter error.
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }
}

/// Result type for estimator operations.
pub type Result<T> = std::result::Result<T, EstimatorError>;
