//! Gaussian radial influence.
//!
//! Every source spreads its value over the plane with a Gaussian falloff:
//!
//! ```text
//! influence_i(x, y) = baseline + (v_i - baseline) * exp(-d² / (2σ²))
//! ```
//!
//! The field is the pointwise maximum over all sources, so overlapping
//! sources never sum above the strongest one. With the default baseline of
//! zero this is the plain `v * exp(-d² / 2σ²)` falloff.

use survey_common::{Dataset, EvaluationGrid, Sample, ScalarField, ValueField};
use tracing::{debug, warn};

use crate::error::{EstimatorError, Result};
use crate::{evaluate_grid, Estimate, EstimateWarning, FieldEstimator};

/// Max-aggregated Gaussian influence around each source.
#[derive(Debug, Clone, Copy)]
pub struct RadialInfluenceEstimator {
    sigma: f64,
    baseline: f64,
}

impl RadialInfluenceEstimator {
    /// Create an estimator with spread `sigma` in pixels.
    pub fn new(sigma: f64) -> Result<Self> {
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(EstimatorError::invalid_parameter(
                "sigma",
                format!("must be a positive number, got {}", sigma),
            ));
        }
        Ok(Self {
            sigma,
            baseline: 0.0,
        })
    }

    /// Value approached far away from every source.
    ///
    /// Useful for fields such as RSSI whose values are negative.
    pub fn with_baseline(mut self, baseline: f64) -> Self {
        self.baseline = baseline;
        self
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    pub fn baseline(&self) -> f64 {
        self.baseline
    }

    /// Aggregated influence of `samples` at `(x, y)`.
    pub fn influence_at(&self, samples: &[Sample], x: f64, y: f64) -> Option<f64> {
        let two_sigma2 = 2.0 * self.sigma * self.sigma;
        samples
            .iter()
            .map(|s| {
                let d2 = (x - s.x).powi(2) + (y - s.y).powi(2);
                self.baseline + (s.value - self.baseline) * (-d2 / two_sigma2).exp()
            })
            .reduce(f64::max)
    }
}

impl FieldEstimator for RadialInfluenceEstimator {
    fn name(&self) -> String {
        format!("radial(sigma={})", self.sigma)
    }

    fn estimate(&self, grid: &EvaluationGrid, dataset: &Dataset, value_field: ValueField) -> Result<Estimate> {
        let samples = dataset.samples(value_field);

        if samples.is_empty() {
            warn!(sigma = self.sigma, "No sources with a value; field is undefined");
            return Ok(Estimate {
                field: ScalarField::undefined(grid),
                warnings: vec![EstimateWarning::DegenerateDataset {
                    method: self.name(),
                    usable_points: 0,
                }],
            });
        }

        debug!(
            sigma = self.sigma,
            baseline = self.baseline,
            sources = samples.len(),
            rows = grid.rows(),
            cols = grid.cols(),
            "Computing radial influence"
        );

        let field = evaluate_grid(grid, |x, y| self.influence_at(&samples, x, y))?;

        Ok(Estimate {
            field,
            warnings: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_sigma() {
        assert!(RadialInfluenceEstimator::new(0.0).is_err());
        assert!(RadialInfluenceEstimator::new(-1.0).is_err());
        assert!(RadialInfluenceEstimator::new(f64::INFINITY).is_err());
        assert!(RadialInfluenceEstimator::new(f64::NAN).is_err());
    }

    #[test]
    fn test_single_source_profile() {
        let est = RadialInfluenceEstimator::new(50.0).unwrap();
        let samples = [Sample {
            x: 100.0,
            y: 100.0,
            value: 50.0,
        }];
        assert_eq!(est.influence_at(&samples, 100.0, 100.0), Some(50.0));

        let at_sigma = est.influence_at(&samples, 150.0, 100.0).unwrap();
        assert!((at_sigma - 50.0 * (-0.5f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn test_baseline_decay() {
        let est = RadialInfluenceEstimator::new(10.0).unwrap().with_baseline(-100.0);
        let samples = [Sample {
            x: 0.0,
            y: 0.0,
            value: -40.0,
        }];
        assert_eq!(est.influence_at(&samples, 0.0, 0.0), Some(-40.0));
        let far = est.influence_at(&samples, 500.0, 0.0).unwrap();
        assert!((far + 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_samples() {
        let est = RadialInfluenceEstimator::new(1.0).unwrap();
        assert_eq!(est.influence_at(&[], 0.0, 0.0), None);
    }
}
