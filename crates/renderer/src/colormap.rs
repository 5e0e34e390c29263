//! Color maps from normalized values to RGBA.
//!
//! Built-in palettes approximate their matplotlib namesakes with evenly
//! spaced stops. Custom palettes are loaded from a JSON style file:
//!
//! ```json
//! {
//!   "name": "signal",
//!   "stops": [
//!     { "value": 0.0, "color": "#2B0A3D" },
//!     { "value": 1.0, "color": "#F6E05E", "label": "strong" }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RenderError, Result};

/// 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::new(255, 255, 255, 255);
    pub const BLACK: Color = Color::new(0, 0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from `#rrggbb` (the `#` is optional).
    pub fn from_hex(text: &str) -> Option<Self> {
        let digits = text.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?, 255))
    }

    /// Straight-line blend towards `other`, `t` clamped to `[0, 1]`.
    pub fn lerp(self, other: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |from: u8, to: u8| (from as f32 + (to as f32 - from as f32) * t).round() as u8;
        Color::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }

    pub fn to_rgba(self) -> image::Rgba<u8> {
        image::Rgba([self.r, self.g, self.b, self.a])
    }
}

/// One entry of a style file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ColorStop {
    /// Position on the normalized `[0, 1]` scale.
    pub value: f32,
    /// `#rrggbb`.
    pub color: String,
    /// Display label, ignored when coloring.
    #[serde(default)]
    pub label: Option<String>,
}

/// Custom palette as stored on disk.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StyleDefinition {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub stops: Vec<ColorStop>,
}

impl StyleDefinition {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }
}

/// Piecewise-linear palette over `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Colormap {
    name: String,
    stops: Vec<(f32, Color)>,
}

const VIRIDIS: [&str; 9] = [
    "#440154", "#472D7B", "#3B528B", "#2C728E", "#21918C", "#28AE80", "#5EC962", "#ADDC30", "#FDE725",
];

const PLASMA: [&str; 9] = [
    "#0D0887", "#4C02A1", "#7E03A8", "#A92395", "#CC4778", "#E56B5D", "#F89540", "#FDC328", "#F0F921",
];

impl Colormap {
    /// Names accepted by [`Colormap::named`].
    pub const BUILTIN: [&'static str; 4] = ["viridis", "hot", "plasma", "greys"];

    /// Look up a built-in palette (case-insensitive).
    pub fn named(name: &str) -> Result<Self> {
        let name = name.trim().to_lowercase();
        let stops = match name.as_str() {
            "viridis" => evenly_spaced(&VIRIDIS),
            "plasma" => evenly_spaced(&PLASMA),
            "hot" => vec![
                (0.0, Color::new(11, 0, 0, 255)),
                (0.365, Color::new(255, 0, 0, 255)),
                (0.746, Color::new(255, 255, 0, 255)),
                (1.0, Color::new(255, 255, 255, 255)),
            ],
            "greys" | "grays" => vec![(0.0, Color::WHITE), (1.0, Color::BLACK)],
            _ => return Err(RenderError::UnknownColormap(name)),
        };
        Ok(Self { name, stops })
    }

    /// Build a palette from a custom style.
    ///
    /// Requires at least two stops with ascending values inside `[0, 1]`
    /// and valid `#rrggbb` colors.
    pub fn from_style(style: &StyleDefinition) -> Result<Self> {
        if style.stops.len() < 2 {
            return Err(RenderError::InvalidStyle(format!(
                "'{}' needs at least 2 stops, got {}",
                style.name,
                style.stops.len()
            )));
        }

        let mut stops = Vec::with_capacity(style.stops.len());
        for stop in &style.stops {
            if !(0.0..=1.0).contains(&stop.value) {
                return Err(RenderError::InvalidStyle(format!(
                    "stop value {} outside [0, 1]",
                    stop.value
                )));
            }
            if let Some(&(prev, _)) = stops.last() {
                if stop.value < prev {
                    return Err(RenderError::InvalidStyle(
                        "stop values must be ascending".to_string(),
                    ));
                }
            }
            let color = Color::from_hex(&stop.color)
                .ok_or_else(|| RenderError::InvalidStyle(format!("bad color '{}'", stop.color)))?;
            stops.push((stop.value, color));
        }

        Ok(Self {
            name: style.name.clone(),
            stops,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Color at normalized position `t`, clamped to `[0, 1]`.
    pub fn color_at(&self, t: f64) -> Color {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) } as f32;

        let (first_value, first_color) = self.stops[0];
        if t <= first_value {
            return first_color;
        }

        for pair in self.stops.windows(2) {
            let (v0, c0) = pair[0];
            let (v1, c1) = pair[1];
            if t <= v1 {
                let span = v1 - v0;
                let local = if span <= f32::EPSILON { 1.0 } else { (t - v0) / span };
                return c0.lerp(c1, local);
            }
        }

        self.stops[self.stops.len() - 1].1
    }
}

fn evenly_spaced(hex: &[&str]) -> Vec<(f32, Color)> {
    let last = (hex.len() - 1) as f32;
    hex.iter()
        .enumerate()
        .filter_map(|(i, h)| {
            Color::from_hex(h).map(|c| (i as f32 / last, c))
        })
        .collect()
}
