//! Render options.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::colormap::{Colormap, StyleDefinition};
use crate::error::Result;

/// Where grid row 0 is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Row 0 (pixel y = 0) at the top, matching raster pixel order.
    #[default]
    Upper,
    /// Row 0 at the bottom, as in a plot with an upward y axis.
    Lower,
}

/// How the field grid is sampled at raster pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resampling {
    Nearest,
    #[default]
    Bilinear,
}

/// Options controlling how a field is drawn over the base raster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Alpha of the field overlay in `[0, 1]`.
    pub opacity: f64,

    /// Built-in colormap name.
    pub colormap: String,

    /// JSON style file; overrides `colormap` when set.
    pub colormap_file: Option<PathBuf>,

    /// `[min, max]` used for normalization instead of the field's range.
    pub fixed_scale: Option<[f64; 2]>,

    pub origin: Origin,

    pub resampling: Resampling,

    /// `#rrggbb` drawn for undefined cells; transparent when unset.
    pub undefined_fill: Option<String>,

    /// Draw source points as markers.
    pub overlay_points: bool,

    /// Append the color bar panel.
    pub legend: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            opacity: 0.6,
            colormap: "viridis".to_string(),
            colormap_file: None,
            fixed_scale: None,
            origin: Origin::Upper,
            resampling: Resampling::Bilinear,
            undefined_fill: None,
            overlay_points: false,
            legend: true,
        }
    }
}

impl RenderOptions {
    /// Validate the options.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(format!("opacity must be within [0, 1], got {}", self.opacity));
        }

        if let Some([min, max]) = self.fixed_scale {
            if !min.is_finite() || !max.is_finite() {
                return Err("fixed_scale bounds must be finite".to_string());
            }
            if min >= max {
                return Err(format!("fixed_scale min {} must be below max {}", min, max));
            }
        }

        if self.colormap_file.is_none() && Colormap::named(&self.colormap).is_err() {
            return Err(format!(
                "unknown colormap '{}', expected one of {:?}",
                self.colormap,
                Colormap::BUILTIN
            ));
        }

        if let Some(fill) = &self.undefined_fill {
            if crate::colormap::Color::from_hex(fill).is_none() {
                return Err(format!("undefined_fill '{}' is not a #rrggbb color", fill));
            }
        }

        Ok(())
    }

    /// Load the configured palette.
    pub fn resolve_colormap(&self) -> Result<Colormap> {
        match &self.colormap_file {
            Some(path) => Colormap::from_style(&StyleDefinition::from_file(path)?),
            None => Colormap::named(&self.colormap),
        }
    }

    pub fn fixed_range(&self) -> Option<(f64, f64)> {
        self.fixed_scale.map(|[min, max]| (min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_valid() {
        let options = RenderOptions::default();
        assert!(options.validate().is_ok());
        assert_eq!(options.opacity, 0.6);
        assert_eq!(options.origin, Origin::Upper);
    }

    #[test]
    fn test_validate_rejects() {
        let bad_opacity = RenderOptions {
            opacity: 1.5,
            ..Default::default()
        };
        assert!(bad_opacity.validate().is_err());

        let inverted = RenderOptions {
            fixed_scale: Some([10.0, 0.0]),
            ..Default::default()
        };
        assert!(inverted.validate().is_err());

        let unknown = RenderOptions {
            colormap: "jet".to_string(),
            ..Default::default()
        };
        assert!(unknown.validate().is_err());

        let bad_fill = RenderOptions {
            undefined_fill: Some("grey".to_string()),
            ..Default::default()
        };
        assert!(bad_fill.validate().is_err());
    }
}
