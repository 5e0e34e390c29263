//! Value normalization onto `[0, 1]`.

use survey_common::ScalarField;

/// Ranges narrower than this map every value to the middle of the palette.
const MIN_RANGE: f64 = 0.001;

/// Linear mapping from field values to the colormap domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueScale {
    pub min: f64,
    pub max: f64,
}

impl ValueScale {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Scale spanning the defined cells of `field`, or `fixed` when given.
    ///
    /// Returns `None` when no scale is fixed and the field has no defined
    /// cell.
    pub fn for_field(field: &ScalarField, fixed: Option<(f64, f64)>) -> Option<Self> {
        fixed
            .or_else(|| field.defined_range())
            .map(|(min, max)| Self::new(min, max))
    }

    /// Map `value` into `[0, 1]`, clamping values outside the range.
    pub fn normalize(&self, value: f64) -> f64 {
        let range = self.max - self.min;
        if range.abs() < MIN_RANGE {
            0.5
        } else {
            ((value - self.min) / range).clamp(0.0, 1.0)
        }
    }

    /// `count` evenly spaced values from `min` to `max` inclusive.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        match count {
            0 => Vec::new(),
            1 => vec![self.min],
            _ => {
                let step = (self.max - self.min) / (count - 1) as f64;
                (0..count)
                    .map(|i| if i == count - 1 { self.max } else { self.min + step * i as f64 })
                    .collect()
            }
        }
    }
}
