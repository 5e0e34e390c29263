//! Heatmap rendering over a base raster.
//!
//! Rendering steps:
//! - Normalize defined field values to `[0, 1]`
//! - Map through a colormap, leaving undefined cells transparent
//! - Alpha-composite over the base raster
//! - Optionally draw source markers and a color bar panel
//! - Encode a deterministic PNG

pub mod colormap;
pub mod composite;
pub mod error;
pub mod legend;
pub mod markers;
pub mod options;
pub mod output;
pub mod png;
pub mod scale;

use image::RgbaImage;
use survey_common::{Sample, ScalarField};
use tracing::debug;

pub use colormap::{Color, Colormap, StyleDefinition};
pub use error::{RenderError, Result};
pub use legend::{LegendSpec, LEGEND_PANEL_WIDTH};
pub use options::{Origin, RenderOptions, Resampling};
pub use output::{load_base_raster, write_all_atomic, write_atomic};
pub use scale::ValueScale;

use composite::FieldPainter;

/// A composited image and the scale used to color it.
#[derive(Debug, Clone)]
pub struct RenderedHeatmap {
    pub image: RgbaImage,
    /// `None` when neither the field nor the samples carry a value.
    pub scale: Option<ValueScale>,
}

/// Draws scalar fields over a base raster.
#[derive(Debug, Clone)]
pub struct Renderer {
    options: RenderOptions,
    colormap: Colormap,
    undefined_fill: Option<Color>,
}

impl Renderer {
    /// Validate `options` and load the palette.
    pub fn new(options: RenderOptions) -> Result<Self> {
        options
            .validate()
            .map_err(|message| RenderError::InvalidParameter {
                param: "render".to_string(),
                message,
            })?;

        let colormap = options.resolve_colormap()?;
        let undefined_fill = options
            .undefined_fill
            .as_deref()
            .and_then(Color::from_hex);

        Ok(Self {
            options,
            colormap,
            undefined_fill,
        })
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn colormap(&self) -> &Colormap {
        &self.colormap
    }

    /// Composite `field` over `base`.
    ///
    /// `samples` are drawn as markers in the given order when point overlay
    /// is enabled. The field is stretched over the whole raster.
    pub fn render(&self, base: &RgbaImage, field: &ScalarField, samples: &[Sample]) -> Result<RenderedHeatmap> {
        if base.width() == 0 || base.height() == 0 {
            return Err(RenderError::EmptyRaster);
        }

        let scale = ValueScale::for_field(field, self.options.fixed_range())
            .or_else(|| sample_range(samples).map(|(min, max)| ValueScale::new(min, max)));

        let mut canvas = base.clone();

        if let Some(scale) = scale {
            FieldPainter {
                field,
                scale,
                colormap: &self.colormap,
                opacity: self.options.opacity,
                origin: self.options.origin,
                resampling: self.options.resampling,
                undefined_fill: self.undefined_fill,
            }
            .paint(&mut canvas);

            if self.options.overlay_points {
                markers::draw_markers(&mut canvas, samples, &scale, &self.colormap, self.options.origin);
            }
        }

        if self.options.legend && scale.is_some() {
            canvas = legend::append_legend_panel(&canvas, &self.colormap);
        }

        debug!(
            width = canvas.width(),
            height = canvas.height(),
            colormap = self.colormap.name(),
            min = scale.map(|s| s.min),
            max = scale.map(|s| s.max),
            "Rendered heatmap"
        );

        Ok(RenderedHeatmap { image: canvas, scale })
    }

    /// Legend descriptor for a rendered heatmap.
    pub fn legend_spec(&self, scale: &ValueScale, title: &str, units: &str) -> LegendSpec {
        LegendSpec::new(title, units, &self.colormap, scale)
    }
}

/// Encode an image as PNG, indexed when it has at most 256 colors.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    png::encode_auto(image.as_raw(), image.width() as usize, image.height() as usize)
}

fn sample_range(samples: &[Sample]) -> Option<(f64, f64)> {
    samples.iter().fold(None, |acc, s| match acc {
        None => Some((s.value, s.value)),
        Some((lo, hi)) => Some((lo.min(s.value), hi.max(s.value))),
    })
}
