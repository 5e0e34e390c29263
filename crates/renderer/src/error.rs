//! Error types for rendering.

use thiserror::Error;

/// Errors that can occur while rendering or writing a heatmap.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Base raster could not be decoded.
    #[error("image error: {0}")]
    Image(String),

    /// PNG encoding failed.
    #[error("PNG encoding failed: {0}")]
    Encode(String),

    /// Colormap name is not built in.
    #[error("unknown colormap: {0}")]
    UnknownColormap(String),

    /// Custom colormap definition is malformed.
    #[error("invalid colormap style: {0}")]
    InvalidStyle(String),

    /// A render option is outside its valid range.
    #[error("invalid render parameter '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    /// Base raster has no pixels.
    #[error("base raster is empty")]
    EmptyRaster,

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for RenderError {
    fn from(err: std::io::Error) -> Self {
        RenderError::Io(err.to_string())
    }
}

impl From<image::ImageError> for RenderError {
    fn from(err: image::ImageError) -> Self {
        RenderError::Image(err.to_string())
    }
}

impl From<serde_json::Error> for RenderError {
    fn from(err: serde_json::Error) -> Self {
        RenderError::InvalidStyle(err.to_string())
    }
}

/// Result type for rendering operations.
pub type Result<T> = std::result::Result<T, RenderError>;
