//! Color legend: an in-band color bar and a JSON descriptor.
//!
//! The bar carries no text, so the value labels live in the descriptor
//! written next to the image.

use image::{imageops, Rgba, RgbaImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use serde::{Deserialize, Serialize};

use crate::colormap::{Color, Colormap};
use crate::error::Result;
use crate::scale::ValueScale;

/// Width of the panel appended to the right of the raster.
pub const LEGEND_PANEL_WIDTH: u32 = 60;

/// Number of tick marks along the bar.
pub const LEGEND_TICKS: usize = 5;

const BAR_OFFSET: u32 = 15;
const BAR_WIDTH: u32 = 20;
const TICK_LENGTH: f32 = 7.0;
const MAX_MARGIN: u32 = 20;

/// Legend descriptor written next to the image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendSpec {
    pub title: String,
    pub units: String,
    pub colormap: String,
    pub min: f64,
    pub max: f64,
    /// Tick values from bottom (min) to top (max).
    pub ticks: Vec<f64>,
}

impl LegendSpec {
    pub fn new(title: &str, units: &str, colormap: &Colormap, scale: &ValueScale) -> Self {
        Self {
            title: title.to_string(),
            units: units.to_string(),
            colormap: colormap.name().to_string(),
            min: scale.min,
            max: scale.max,
            ticks: scale.ticks(LEGEND_TICKS),
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}

/// Vertical extent of the bar, `(top, bottom)` inclusive.
fn bar_span(height: u32) -> (u32, u32) {
    let margin = (height / 4).min(MAX_MARGIN);
    (margin, height.saturating_sub(1 + margin))
}

/// Copy `image` onto a wider canvas with the color bar panel on the right.
///
/// The bar runs from the colormap's maximum at the top to its minimum at
/// the bottom and is framed, with evenly spaced tick marks.
pub fn append_legend_panel(image: &RgbaImage, colormap: &Colormap) -> RgbaImage {
    let (width, height) = image.dimensions();
    let mut canvas = RgbaImage::from_pixel(width + LEGEND_PANEL_WIDTH, height, Color::WHITE.to_rgba());
    imageops::replace(&mut canvas, image, 0, 0);

    let (top, bottom) = bar_span(height);
    let span = bottom - top;
    let x0 = width + BAR_OFFSET;

    for y in top..=bottom {
        let t = if span == 0 { 1.0 } else { 1.0 - (y - top) as f64 / span as f64 };
        let color = colormap.color_at(t).to_rgba();
        for x in x0..x0 + BAR_WIDTH {
            canvas.put_pixel(x, y, color);
        }
    }

    let black: Rgba<u8> = Color::BLACK.to_rgba();
    draw_hollow_rect_mut(
        &mut canvas,
        Rect::at(x0 as i32 - 1, top as i32 - 1).of_size(BAR_WIDTH + 2, span + 3),
        black,
    );

    let tick_x = (x0 + BAR_WIDTH) as f32;
    for i in 0..LEGEND_TICKS {
        let y = top as f32 + span as f32 * i as f32 / (LEGEND_TICKS - 1) as f32;
        draw_line_segment_mut(&mut canvas, (tick_x, y), (tick_x + TICK_LENGTH, y), black);
    }

    canvas
}
