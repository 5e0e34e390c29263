//! Scattered-data interpolation over a Delaunay triangulation.
//!
//! - `nearest`: value of the closest source (first in dataset order on ties).
//!   Defined everywhere when at least one source exists.
//! - `linear`: barycentric interpolation inside the containing triangle.
//! - `cubic`: Clough-Tocher C1 macro-element with least-squares gradients.
//!
//! Linear and cubic are undefined outside the convex hull of the sources.
//! At a source position every method returns that source's value exactly.

pub mod clough_tocher;
pub mod delaunay;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use rstar::primitives::GeomWithData;
use rstar::RTree;
use serde::{Deserialize, Serialize};
use survey_common::{Dataset, EvaluationGrid, Sample, ScalarField, ValueField};
use tracing::{debug, warn};

use crate::error::{EstimatorError, Result};
use crate::{evaluate_grid, Estimate, EstimateWarning, FieldEstimator};
use clough_tocher::CloughTocher;
use delaunay::Triangulation;

/// Interpolation method for scattered sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScatteredMethod {
    Nearest,
    Linear,
    #[default]
    Cubic,
}

impl ScatteredMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nearest => "nearest",
            Self::Linear => "linear",
            Self::Cubic => "cubic",
        }
    }

    /// Minimum number of non-collinear sources the method needs.
    pub fn min_points(&self) -> usize {
        match self {
            Self::Nearest => 1,
            Self::Linear | Self::Cubic => 3,
        }
    }
}

impl FromStr for ScatteredMethod {
    type Err = EstimatorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "nearest" => Ok(Self::Nearest),
            "linear" => Ok(Self::Linear),
            "cubic" => Ok(Self::Cubic),
            _ => Err(EstimatorError::UnknownMethod(s.to_string())),
        }
    }
}

impl fmt::Display for ScatteredMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interpolates scattered samples onto a grid.
#[derive(Debug, Clone, Copy)]
pub struct ScatteredInterpolator {
    method: ScatteredMethod,
}

impl ScatteredInterpolator {
    pub fn new(method: ScatteredMethod) -> Self {
        Self { method }
    }

    pub fn method(&self) -> ScatteredMethod {
        self.method
    }

    fn degenerate(&self, grid: &EvaluationGrid, usable_points: usize, mut warnings: Vec<EstimateWarning>) -> Estimate {
        warn!(
            method = %self.method,
            usable_points,
            "Too few non-collinear sources; field is undefined"
        );
        warnings.push(EstimateWarning::DegenerateDataset {
            method: self.name(),
            usable_points,
        });
        Estimate {
            field: ScalarField::undefined(grid),
            warnings,
        }
    }
}

impl FieldEstimator for ScatteredInterpolator {
    fn name(&self) -> String {
        format!("scattered({})", self.method)
    }

    fn estimate(&self, grid: &EvaluationGrid, dataset: &Dataset, value_field: ValueField) -> Result<Estimate> {
        let (samples, dropped) = dedupe(dataset.samples(value_field));
        let mut warnings = Vec::new();
        if dropped > 0 {
            warn!(dropped, "Coincident sources ignored, keeping the first");
            warnings.push(EstimateWarning::DuplicatePoints { dropped });
        }

        debug!(
            method = %self.method,
            sources = samples.len(),
            rows = grid.rows(),
            cols = grid.cols(),
            "Interpolating scattered sources"
        );

        if samples.len() < self.method.min_points() {
            return Ok(self.degenerate(grid, samples.len(), warnings));
        }

        let exact = ExactLookup::new(&samples);

        let field = match self.method {
            ScatteredMethod::Nearest => {
                let index = NearestSource::new(&samples);
                evaluate_grid(grid, |x, y| exact.get(x, y).or_else(|| index.value_at(x, y)))?
            }
            ScatteredMethod::Linear | ScatteredMethod::Cubic => {
                let points: Vec<[f64; 2]> = samples.iter().map(|s| [s.x, s.y]).collect();
                let values: Vec<f64> = samples.iter().map(|s| s.value).collect();

                let Some(tri) = Triangulation::new(points) else {
                    return Ok(self.degenerate(grid, samples.len(), warnings));
                };

                if self.method == ScatteredMethod::Linear {
                    evaluate_grid(grid, |x, y| {
                        exact.get(x, y).or_else(|| {
                            let (t, l) = tri.locate([x, y])?;
                            let [a, b, c] = tri.triangles()[t];
                            Some(l[0] * values[a] + l[1] * values[b] + l[2] * values[c])
                        })
                    })?
                } else {
                    let interpolant = CloughTocher::new(&tri, &values);
                    evaluate_grid(grid, |x, y| {
                        exact.get(x, y).or_else(|| {
                            let (t, l) = tri.locate([x, y])?;
                            Some(interpolant.evaluate(t, l))
                        })
                    })?
                }
            }
        };

        debug!(
            defined = field.defined_count(),
            undefined = field.undefined_count(),
            "Interpolation complete"
        );

        Ok(Estimate { field, warnings })
    }
}

/// Drop sources that share a position with an earlier one.
fn dedupe(samples: Vec<Sample>) -> (Vec<Sample>, usize) {
    let before = samples.len();
    let mut seen = std::collections::HashSet::with_capacity(before);
    let kept: Vec<Sample> = samples
        .into_iter()
        .filter(|s| seen.insert(position_key(s.x, s.y)))
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}

fn position_key(x: f64, y: f64) -> (u64, u64) {
    // +0.0 folds negative zero onto positive zero.
    ((x + 0.0).to_bits(), (y + 0.0).to_bits())
}

/// Source values keyed by exact position.
struct ExactLookup(HashMap<(u64, u64), f64>);

impl ExactLookup {
    fn new(samples: &[Sample]) -> Self {
        Self(samples.iter().map(|s| (position_key(s.x, s.y), s.value)).collect())
    }

    fn get(&self, x: f64, y: f64) -> Option<f64> {
        self.0.get(&position_key(x, y)).copied()
    }
}

/// Sources indexed by position; values carry their dataset order.
struct NearestSource {
    tree: RTree<GeomWithData<[f64; 2], usize>>,
    values: Vec<f64>,
}

impl NearestSource {
    fn new(samples: &[Sample]) -> Self {
        let entries = samples
            .iter()
            .enumerate()
            .map(|(i, s)| GeomWithData::new([s.x, s.y], i))
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
            values: samples.iter().map(|s| s.value).collect(),
        }
    }

    /// Value of the closest source, the earliest one among equal distances.
    fn value_at(&self, x: f64, y: f64) -> Option<f64> {
        let mut hits = self.tree.nearest_neighbor_iter_with_distance_2(&[x, y]);
        let (first, best) = hits.next()?;
        let mut order = first.data;
        for (entry, d2) in hits {
            if d2 > best {
                break;
            }
            order = order.min(entry.data);
        }
        Some(self.values[order])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(x: f64, y: f64, value: f64) -> Sample {
        Sample { x, y, value }
    }

    #[test]
    fn test_method_parse() {
        assert_eq!("Cubic".parse::<ScatteredMethod>().unwrap(), ScatteredMethod::Cubic);
        assert_eq!(" linear ".parse::<ScatteredMethod>().unwrap(), ScatteredMethod::Linear);
        assert!(matches!(
            "spline".parse::<ScatteredMethod>(),
            Err(EstimatorError::UnknownMethod(_))
        ));
    }

    #[test]
    fn test_dedupe_keeps_first() {
        let (kept, dropped) = dedupe(vec![
            sample(1.0, 1.0, 10.0),
            sample(2.0, 2.0, 20.0),
            sample(1.0, 1.0, 30.0),
            sample(-0.0, 0.0, 1.0),
            sample(0.0, 0.0, 2.0),
        ]);
        assert_eq!(dropped, 2);
        assert_eq!(kept.len(), 3);
        assert_eq!(kept[0].value, 10.0);
        assert_eq!(kept[2].value, 1.0);
    }

    #[test]
    fn test_nearest_tie_goes_to_first() {
        let index = NearestSource::new(&[sample(2.0, 0.0, 2.0), sample(0.0, 0.0, 1.0)]);
        assert_eq!(index.value_at(1.0, 0.0), Some(2.0));
        assert_eq!(index.value_at(0.5, 0.0), Some(1.0));

        // Four sources equidistant from the centre.
        let index = NearestSource::new(&[
            sample(10.0, 0.0, 4.0),
            sample(0.0, 10.0, 3.0),
            sample(-10.0, 0.0, 2.0),
            sample(0.0, -10.0, 1.0),
        ]);
        assert_eq!(index.value_at(0.0, 0.0), Some(4.0));
        assert!(NearestSource::new(&[]).value_at(1.0, 0.0).is_none());
    }

    #[test]
    fn test_nearest_matches_exhaustive_search() {
        let samples: Vec<Sample> = (0..200u32)
            .map(|i| sample(((i * 37) % 211) as f64, ((i * 91) % 197) as f64, i as f64))
            .collect();
        let index = NearestSource::new(&samples);

        for gy in 0..40 {
            for gx in 0..40 {
                let (x, y) = (gx as f64 * 5.5, gy as f64 * 5.0);
                let mut expected = None;
                let mut best = f64::INFINITY;
                for s in &samples {
                    let d2 = (s.x - x).powi(2) + (s.y - y).powi(2);
                    if d2 < best {
                        best = d2;
                        expected = Some(s.value);
                    }
                }
                assert_eq!(index.value_at(x, y), expected, "at ({}, {})", x, y);
            }
        }
    }
}
