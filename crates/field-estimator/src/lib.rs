//! Scalar field estimation from scattered survey measurements.
//!
//! Two interchangeable strategies share one contract,
//! `(grid, dataset, value_field) -> ScalarField`:
//!
//! - [`ScatteredInterpolator`]: nearest / linear / cubic interpolation over
//!   a Delaunay triangulation of the sources. Undefined outside the convex
//!   hull (linear, cubic).
//! - [`RadialInfluenceEstimator`]: Gaussian falloff around every source,
//!   aggregated with `max`. Defined everywhere.
//!
//! # Architecture
//!
//! ```text
//! Dataset ──► samples(value_field) ──┐
//!                                    ├──► per-cell evaluation (rayon) ──► ScalarField
//! EvaluationGrid ──► (x, y) mesh ────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use field_estimator::{EstimatorConfig, FieldEstimator};
//!
//! let estimator = EstimatorConfig::default().build()?;
//! let estimate = estimator.estimate(&grid, &dataset, ValueField::Download)?;
//! ```

pub mod config;
pub mod error;
pub mod radial;
pub mod scattered;

use std::fmt;

use rayon::prelude::*;
use survey_common::{Dataset, EvaluationGrid, ScalarField, ValueField};

// Re-export commonly used types at crate root
pub use config::EstimatorConfig;
pub use error::{EstimatorError, Result};
pub use radial::RadialInfluenceEstimator;
pub use scattered::{ScatteredInterpolator, ScatteredMethod};

/// Maps a dataset onto an evaluation grid.
pub trait FieldEstimator: Send + Sync {
    /// Short human-readable description, e.g. `scattered(cubic)`.
    fn name(&self) -> String;

    /// Estimate `value_field` at every grid cell.
    fn estimate(
        &self,
        grid: &EvaluationGrid,
        dataset: &Dataset,
        value_field: ValueField,
    ) -> Result<Estimate>;
}

/// A field plus the recoverable conditions met while producing it.
#[derive(Debug, Clone)]
pub struct Estimate {
    pub field: ScalarField,
    pub warnings: Vec<EstimateWarning>,
}

impl Estimate {
    /// Whether the dataset was too small or collinear for the method.
    pub fn is_degenerate(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, EstimateWarning::DegenerateDataset { .. }))
    }
}

/// Recoverable conditions reported by an estimator.
#[derive(Debug, Clone, PartialEq)]
pub enum EstimateWarning {
    /// Not enough usable points for the method; the field is all undefined.
    DegenerateDataset {
        method: String,
        usable_points: usize,
    },
    /// Coincident sources were collapsed to the first in dataset order.
    DuplicatePoints { dropped: usize },
}

impl fmt::Display for EstimateWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EstimateWarning::DegenerateDataset {
                method,
                usable_points,
            } => write!(
                f,
                "{} needs at least 3 non-collinear points, got {} usable",
                method, usable_points
            ),
            EstimateWarning::DuplicatePoints { dropped } => {
                write!(f, "{} coincident source points ignored", dropped)
            }
        }
    }
}

/// Evaluate `f` at every grid point in parallel, preserving row-major order.
pub(crate) fn evaluate_grid<F>(grid: &EvaluationGrid, f: F) -> Result<ScalarField>
where
    F: Fn(f64, f64) -> Option<f64> + Sync,
{
    let cells: Vec<Option<f64>> = grid
        .x_mesh()
        .par_iter()
        .zip(grid.y_mesh().par_iter())
        .map(|(&x, &y)| f(x, y))
        .collect();

    let actual = cells.len();
    ScalarField::new(grid.rows(), grid.cols(), cells).ok_or(EstimatorError::ShapeMismatch {
        expected: grid.len(),
        actual,
    })
}
