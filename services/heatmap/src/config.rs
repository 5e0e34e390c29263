//! Heatmap run configuration.
//!
//! Options are layered in a fixed order, later layers winning:
//!
//! 1. Built-in defaults
//! 2. YAML configuration file
//! 3. `HEATMAP_*` environment variables
//! 4. Command-line flags
//!
//! ```yaml
//! sources:
//!   - path: wifi_survey_log.csv
//!   - path: second_floor.csv
//!     renames:
//!       x: Latitude
//!       y: Longitude
//! base_raster: komabamap.png
//! value_field: RSSI_dBm
//! estimator:
//!   kind: radial
//!   sigma: 40.0
//!   baseline: -100.0
//! render:
//!   colormap: hot
//!   opacity: 0.5
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use field_estimator::config::{DEFAULT_SCATTERED_RESOLUTION, DEFAULT_SIGMA};
use field_estimator::{EstimatorConfig, ScatteredMethod};
use ingestion::SourceSpec;
use renderer::RenderOptions;
use survey_common::ValueField;

use crate::error::{HeatmapError, Result};

/// Default survey table.
pub const DEFAULT_SOURCE: &str = "wifi_survey_log.csv";

/// Default base raster.
pub const DEFAULT_BASE_RASTER: &str = "komabamap.png";

/// What to do when the configured estimator reports a degenerate dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DegenerateFallback {
    /// Keep the all-undefined field.
    #[default]
    #[serde(rename = "none")]
    Disabled,
    /// Retry with nearest-neighbor interpolation.
    Nearest,
    /// Retry with radial influence at the default sigma.
    Radial,
}

impl DegenerateFallback {
    /// Estimator to retry with, if any.
    pub fn estimator(&self, resolution: usize) -> Option<EstimatorConfig> {
        match self {
            Self::Disabled => None,
            Self::Nearest => Some(EstimatorConfig::scattered(ScatteredMethod::Nearest).with_resolution(resolution)),
            Self::Radial => Some(EstimatorConfig::radial(DEFAULT_SIGMA).with_resolution(resolution)),
        }
    }
}

/// Complete configuration for one heatmap run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapConfig {
    /// Survey tables, concatenated in order.
    pub sources: Vec<SourceSpec>,

    /// Map image the field is drawn over.
    pub base_raster: PathBuf,

    /// Directory receiving the image and legend.
    pub output_dir: PathBuf,

    /// Measured quantity to estimate.
    pub value_field: ValueField,

    pub estimator: EstimatorConfig,

    pub degenerate_fallback: DegenerateFallback,

    pub render: RenderOptions,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            sources: vec![SourceSpec::new(DEFAULT_SOURCE)],
            base_raster: PathBuf::from(DEFAULT_BASE_RASTER),
            output_dir: PathBuf::from("."),
            value_field: ValueField::default(),
            estimator: EstimatorConfig::default(),
            degenerate_fallback: DegenerateFallback::default(),
            render: RenderOptions::default(),
        }
    }
}

/// Overrides collected from the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub value_field: Option<String>,
    /// Switches to scattered interpolation with this method.
    pub method: Option<String>,
    /// Switches to radial influence with this sigma.
    pub sigma: Option<f64>,
    pub resolution: Option<usize>,
    pub output_dir: Option<PathBuf>,
    pub overlay_points: bool,
}

impl HeatmapConfig {
    /// Parse a YAML document. Relative paths are kept as written.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| HeatmapError::Config(e.to_string()))
    }

    /// Load a YAML file, resolving relative paths against its directory.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| HeatmapError::Config(format!("failed to read {}: {}", path.display(), e)))?;
        let mut config = Self::from_yaml_str(&content)
            .map_err(|e| HeatmapError::Config(format!("{}: {}", path.display(), e)))?;

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            config.resolve_paths(dir);
        }
        Ok(config)
    }

    /// Apply `HEATMAP_*` environment variables.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| env::var(key).ok())
    }

    /// Apply environment-style overrides from an arbitrary lookup.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("HEATMAP_VALUE_FIELD") {
            self.value_field = value.parse()?;
        }
        if let Some(value) = lookup("HEATMAP_OPACITY") {
            self.render.opacity = value
                .trim()
                .parse()
                .map_err(|_| HeatmapError::Config(format!("HEATMAP_OPACITY is not a number: {}", value)))?;
        }
        if let Some(value) = lookup("HEATMAP_COLORMAP") {
            self.render.colormap = value;
            self.render.colormap_file = None;
        }
        if let Some(value) = lookup("HEATMAP_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(value);
        }
        Ok(())
    }

    /// Apply command-line overrides.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) -> Result<()> {
        if overrides.method.is_some() && overrides.sigma.is_some() {
            return Err(HeatmapError::Config(
                "--method and --sigma select different estimators; pass only one".to_string(),
            ));
        }

        if let Some(value) = &overrides.value_field {
            self.value_field = value.parse()?;
        }

        if let Some(method) = &overrides.method {
            let method: ScatteredMethod = method.parse()?;
            let resolution = overrides.resolution.unwrap_or(match self.estimator {
                EstimatorConfig::Scattered { resolution, .. } => resolution,
                EstimatorConfig::Radial { .. } => DEFAULT_SCATTERED_RESOLUTION,
            });
            self.estimator = EstimatorConfig::scattered(method).with_resolution(resolution);
        } else if let Some(sigma) = overrides.sigma {
            self.estimator = match self.estimator {
                EstimatorConfig::Radial {
                    resolution: current,
                    baseline,
                    ..
                } => EstimatorConfig::Radial {
                    sigma,
                    resolution: overrides.resolution.unwrap_or(current),
                    baseline,
                },
                EstimatorConfig::Scattered { .. } => {
                    let radial = EstimatorConfig::radial(sigma);
                    match overrides.resolution {
                        Some(r) => radial.with_resolution(r),
                        None => radial,
                    }
                }
            };
        } else if let Some(r) = overrides.resolution {
            self.estimator = self.estimator.clone().with_resolution(r);
        }

        if let Some(dir) = &overrides.output_dir {
            self.output_dir = dir.clone();
        }
        if overrides.overlay_points {
            self.render.overlay_points = true;
        }
        Ok(())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.sources.is_empty() {
            return Err("at least one source table is required".to_string());
        }
        self.estimator.validate()?;
        self.render.validate()?;
        Ok(())
    }

    /// Path of the composited image.
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(format!("heatmap_{}.png", self.value_field))
    }

    /// Path of the legend descriptor.
    pub fn legend_path(&self) -> PathBuf {
        self.output_dir.join(format!("heatmap_{}.legend.json", self.value_field))
    }

    fn resolve_paths(&mut self, dir: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = dir.join(&*p);
            }
        };

        for source in &mut self.sources {
            resolve(&mut source.path);
        }
        resolve(&mut self.base_raster);
        resolve(&mut self.output_dir);
        if let Some(style) = &mut self.render.colormap_file {
            resolve(style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = HeatmapConfig::default();
        assert_eq!(config.sources, vec![SourceSpec::new("wifi_survey_log.csv")]);
        assert_eq!(config.base_raster, PathBuf::from("komabamap.png"));
        assert_eq!(config.value_field, ValueField::Download);
        assert_eq!(config.estimator.resolution(), 300);
        assert_eq!(config.degenerate_fallback, DegenerateFallback::Disabled);
        assert!(config.validate().is_ok());
        assert_eq!(config.output_path(), PathBuf::from("./heatmap_Download_Mbps.png"));
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = HeatmapConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, HeatmapConfig::default());
    }

    #[test]
    fn test_parse_full_yaml() {
        let yaml = r#"
sources:
  - path: a.csv
  - path: b.csv
    renames:
      x: Latitude
value_field: RSSI_dBm
estimator:
  kind: radial
  sigma: 40.0
  baseline: -100.0
degenerate_fallback: nearest
render:
  colormap: hot
  opacity: 0.5
  origin: lower
"#;
        let config = HeatmapConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.sources.len(), 2);
        assert!(!config.sources[1].renames.is_empty());
        assert_eq!(config.value_field, ValueField::Rssi);
        assert_eq!(
            config.estimator,
            EstimatorConfig::Radial {
                sigma: 40.0,
                resolution: 100,
                baseline: -100.0
            }
        );
        assert_eq!(config.degenerate_fallback, DegenerateFallback::Nearest);
        assert_eq!(config.render.colormap, "hot");
        assert_eq!(config.render.opacity, 0.5);
        assert!(config.render.legend);
    }

    #[test]
    fn test_unknown_fallback_rejected() {
        assert!(HeatmapConfig::from_yaml_str("degenerate_fallback: cubic").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("HEATMAP_VALUE_FIELD", "upload"),
            ("HEATMAP_OPACITY", "0.25"),
            ("HEATMAP_COLORMAP", "plasma"),
            ("HEATMAP_OUTPUT_DIR", "/tmp/out"),
        ]
        .into_iter()
        .collect();

        let mut config = HeatmapConfig::default();
        config
            .apply_overrides_from(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.value_field, ValueField::Upload);
        assert_eq!(config.render.opacity, 0.25);
        assert_eq!(config.render.colormap, "plasma");
        assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_env_override_bad_opacity() {
        let mut config = HeatmapConfig::default();
        let result = config.apply_overrides_from(|k| (k == "HEATMAP_OPACITY").then(|| "half".to_string()));
        assert!(matches!(result, Err(HeatmapError::Config(_))));
    }

    #[test]
    fn test_cli_sigma_switches_to_radial() {
        let mut config = HeatmapConfig::default();
        config
            .apply_overrides(&ConfigOverrides {
                sigma: Some(30.0),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(config.estimator, EstimatorConfig::radial(30.0));
    }

    #[test]
    fn test_cli_method_and_resolution() {
        let mut config = HeatmapConfig::default();
        config
            .apply_overrides(&ConfigOverrides {
                method: Some("linear".to_string()),
                resolution: Some(50),
                overlay_points: true,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(
            config.estimator,
            EstimatorConfig::Scattered {
                method: ScatteredMethod::Linear,
                resolution: 50
            }
        );
        assert!(config.render.overlay_points);
    }

    #[test]
    fn test_cli_method_and_sigma_conflict() {
        let mut config = HeatmapConfig::default();
        let result = config.apply_overrides(&ConfigOverrides {
            method: Some("nearest".to_string()),
            sigma: Some(10.0),
            ..Default::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects() {
        let no_sources = HeatmapConfig {
            sources: Vec::new(),
            ..Default::default()
        };
        assert!(no_sources.validate().is_err());

        let zero_resolution = HeatmapConfig {
            estimator: EstimatorConfig::default().with_resolution(0),
            ..Default::default()
        };
        assert!(zero_resolution.validate().is_err());

        let mut bad_opacity = HeatmapConfig::default();
        bad_opacity.render.opacity = 2.0;
        assert!(bad_opacity.validate().is_err());

        let bad_sigma = HeatmapConfig {
            estimator: EstimatorConfig::radial(0.0),
            ..Default::default()
        };
        assert!(bad_sigma.validate().is_err());
    }

    #[test]
    fn test_relative_paths_resolved() {
        let mut config = HeatmapConfig::default();
        config.resolve_paths(Path::new("/data/survey"));
        assert_eq!(config.sources[0].path, PathBuf::from("/data/survey/wifi_survey_log.csv"));
        assert_eq!(config.base_raster, PathBuf::from("/data/survey/komabamap.png"));
    }
}
