//! Configuration for field estimation.

use serde::{Deserialize, Serialize};

use crate::error::{EstimatorError, Result};
use crate::radial::RadialInfluenceEstimator;
use crate::scattered::{ScatteredInterpolator, ScatteredMethod};
use crate::FieldEstimator;

/// Default grid resolution for scattered interpolation.
pub const DEFAULT_SCATTERED_RESOLUTION: usize = 300;

/// Default grid resolution for radial influence.
pub const DEFAULT_RADIAL_RESOLUTION: usize = 100;

/// Default Gaussian spread in pixels.
pub const DEFAULT_SIGMA: f64 = 50.0;

/// Which estimator to run, with its parameters.
///
/// ```yaml
/// kind: radial
/// sigma: 40.0
/// resolution: 100
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EstimatorConfig {
    Scattered {
        #[serde(default)]
        method: ScatteredMethod,
        #[serde(default = "default_scattered_resolution")]
        resolution: usize,
    },
    Radial {
        #[serde(default = "default_sigma")]
        sigma: f64,
        #[serde(default = "default_radial_resolution")]
        resolution: usize,
        /// Value the influence decays towards far from every source.
        #[serde(default)]
        baseline: f64,
    },
}

fn default_scattered_resolution() -> usize {
    DEFAULT_SCATTERED_RESOLUTION
}

fn default_radial_resolution() -> usize {
    DEFAULT_RADIAL_RESOLUTION
}

fn default_sigma() -> f64 {
    DEFAULT_SIGMA
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self::Scattered {
            method: ScatteredMethod::default(),
            resolution: DEFAULT_SCATTERED_RESOLUTION,
        }
    }
}

impl EstimatorConfig {
    /// Radial influence with default resolution and baseline.
    pub fn radial(sigma: f64) -> Self {
        Self::Radial {
            sigma,
            resolution: DEFAULT_RADIAL_RESOLUTION,
            baseline: 0.0,
        }
    }

    /// Scattered interpolation with default resolution.
    pub fn scattered(method: ScatteredMethod) -> Self {
        Self::Scattered {
            method,
            resolution: DEFAULT_SCATTERED_RESOLUTION,
        }
    }

    /// Samples per axis of the evaluation grid.
    pub fn resolution(&self) -> usize {
        match self {
            Self::Scattered { resolution, .. } | Self::Radial { resolution, .. } => *resolution,
        }
    }

    /// Replace the grid resolution.
    pub fn with_resolution(mut self, value: usize) -> Self {
        match &mut self {
            Self::Scattered { resolution, .. } | Self::Radial { resolution, .. } => {
                *resolution = value
            }
        }
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.resolution() == 0 {
            return Err("resolution must be > 0".to_string());
        }

        if let Self::Radial {
            sigma, baseline, ..
        } = self
        {
            if !sigma.is_finite() || *sigma <= 0.0 {
                return Err(format!("sigma must be a positive number, got {}", sigma));
            }
            if !baseline.is_finite() {
                return Err("baseline must be finite".to_string());
            }
        }

        Ok(())
    }

    /// Construct the configured estimator.
    pub fn build(&self) -> Result<Box<dyn FieldEstimator>> {
        self.validate()
            .map_err(|message| EstimatorError::invalid_parameter(self.kind(), message))?;

        Ok(match self {
            Self::Scattered { method, .. } => Box::new(ScatteredInterpolator::new(*method)),
            Self::Radial {
                sigma, baseline, ..
            } => Box::new(RadialInfluenceEstimator::new(*sigma)?.with_baseline(*baseline)),
        })
    }

    /// Short estimator kind name.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Scattered { .. } => "scattered",
            Self::Radial { .. } => "radial",
        }
    }
}
