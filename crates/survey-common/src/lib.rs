//! Common types shared across the survey heatmap crates.
//!
//! Data flows strictly forward through these types:
//!
//! ```text
//! CSV tables ──► Dataset ──┐
//!                          ├──► FieldEstimator ──► ScalarField ──► Renderer
//! raster size ──► EvaluationGrid
//! ```

pub mod error;
pub mod field;
pub mod grid;
pub mod record;

pub use error::{SurveyError, SurveyResult};
pub use field::ScalarField;
pub use grid::{EvaluationGrid, GridBuilder};
pub use record::{rssi_from_signal_percent, Dataset, MeasurementRecord, Sample, ValueField};
