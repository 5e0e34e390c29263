//! Resampling the field onto raster pixels and alpha compositing.
//!
//! The evaluation grid spans the raster extent: grid column `c` sits at
//! `x = c * width / (cols - 1)` and row `r` at `y = r * height / (rows - 1)`
//! in data coordinates. [`flip_y`] is the single place where data y is
//! reconciled with raster pixel rows.

use image::{Rgba, RgbaImage};
use rayon::prelude::*;
use survey_common::ScalarField;

use crate::colormap::{Color, Colormap};
use crate::options::{Origin, Resampling};
use crate::scale::ValueScale;

/// Convert between data y and raster pixel y.
///
/// The mapping is its own inverse.
pub fn flip_y(y: f64, height: f64, origin: Origin) -> f64 {
    match origin {
        Origin::Upper => y,
        Origin::Lower => height - y,
    }
}

/// Field value at data position `(x, y)` on a `width` x `height` raster.
///
/// Bilinear sampling falls back to the nearest cell when any of the four
/// surrounding cells is undefined.
pub fn sample_field(
    field: &ScalarField,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    resampling: Resampling,
) -> Option<f64> {
    let (rows, cols) = field.shape();
    if rows == 0 || cols == 0 {
        return None;
    }

    let col_f = fractional_index(x, width, cols);
    let row_f = fractional_index(y, height, rows);

    let nearest = || field.get(row_f.round() as usize, col_f.round() as usize);

    match resampling {
        Resampling::Nearest => nearest(),
        Resampling::Bilinear => {
            let c0 = col_f.floor() as usize;
            let r0 = row_f.floor() as usize;
            let c1 = (c0 + 1).min(cols - 1);
            let r1 = (r0 + 1).min(rows - 1);
            let fx = col_f - c0 as f64;
            let fy = row_f - r0 as f64;

            match (field.get(r0, c0), field.get(r0, c1), field.get(r1, c0), field.get(r1, c1)) {
                (Some(v00), Some(v01), Some(v10), Some(v11)) => {
                    let top = v00 * (1.0 - fx) + v01 * fx;
                    let bottom = v10 * (1.0 - fx) + v11 * fx;
                    Some(top * (1.0 - fy) + bottom * fy)
                }
                _ => nearest(),
            }
        }
    }
}

/// Position of `v` on an axis of `count` samples spanning `[0, extent]`.
fn fractional_index(v: f64, extent: f64, count: usize) -> f64 {
    if count < 2 || extent <= 0.0 {
        return 0.0;
    }
    (v / extent * (count - 1) as f64).clamp(0.0, (count - 1) as f64)
}

/// Porter-Duff "over": `overlay` at `opacity` on top of `base`.
pub fn blend_over(base: Rgba<u8>, overlay: Color, opacity: f64) -> Rgba<u8> {
    let src_a = opacity.clamp(0.0, 1.0) * overlay.a as f64 / 255.0;
    let dst_a = base[3] as f64 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);

    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let channel = |src: u8, dst: u8| -> u8 {
        let value = (src as f64 * src_a + dst as f64 * dst_a * (1.0 - src_a)) / out_a;
        value.round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        channel(overlay.r, base[0]),
        channel(overlay.g, base[1]),
        channel(overlay.b, base[2]),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}

/// Everything needed to color one raster pixel.
pub(crate) struct FieldPainter<'a> {
    pub field: &'a ScalarField,
    pub scale: ValueScale,
    pub colormap: &'a Colormap,
    pub opacity: f64,
    pub origin: Origin,
    pub resampling: Resampling,
    pub undefined_fill: Option<Color>,
}

impl FieldPainter<'_> {
    /// Composite the field over every pixel of `canvas`.
    ///
    /// Pixels over undefined cells keep the base color unless a fill is set.
    pub fn paint(&self, canvas: &mut RgbaImage) {
        let (width, height) = canvas.dimensions();
        let (w, h) = (width as f64, height as f64);
        let row_bytes = width as usize * 4;

        canvas
            .par_chunks_mut(row_bytes)
            .enumerate()
            .for_each(|(py, row)| {
                let y = flip_y(py as f64, h, self.origin);
                for (px, pixel) in row.chunks_exact_mut(4).enumerate() {
                    let overlay = sample_field(self.field, px as f64, y, w, h, self.resampling)
                        .map(|v| self.colormap.color_at(self.scale.normalize(v)))
                        .or(self.undefined_fill);

                    if let Some(color) = overlay {
                        let base = Rgba([pixel[0], pixel[1], pixel[2], pixel[3]]);
                        pixel.copy_from_slice(&blend_over(base, color, self.opacity).0);
                    }
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_2x2() -> ScalarField {
        ScalarField::new(2, 2, vec![Some(0.0), Some(10.0), Some(20.0), Some(30.0)]).unwrap()
    }

    #[test]
    fn test_flip_is_involution() {
        assert_eq!(flip_y(10.0, 600.0, Origin::Upper), 10.0);
        assert_eq!(flip_y(10.0, 600.0, Origin::Lower), 590.0);
        assert_eq!(flip_y(flip_y(123.0, 600.0, Origin::Lower), 600.0, Origin::Lower), 123.0);
    }

    #[test]
    fn test_bilinear_corners_and_center() {
        let field = field_2x2();
        let s = |x, y| sample_field(&field, x, y, 100.0, 100.0, Resampling::Bilinear);
        assert_eq!(s(0.0, 0.0), Some(0.0));
        assert_eq!(s(100.0, 0.0), Some(10.0));
        assert_eq!(s(0.0, 100.0), Some(20.0));
        assert_eq!(s(50.0, 50.0), Some(15.0));
    }

    #[test]
    fn test_bilinear_falls_back_to_nearest() {
        let field = ScalarField::new(2, 2, vec![Some(5.0), None, None, None]).unwrap();
        let s = |x, y| sample_field(&field, x, y, 100.0, 100.0, Resampling::Bilinear);
        assert_eq!(s(10.0, 10.0), Some(5.0));
        assert_eq!(s(90.0, 10.0), None);
    }

    #[test]
    fn test_single_cell_field() {
        let field = ScalarField::new(1, 1, vec![Some(7.0)]).unwrap();
        assert_eq!(sample_field(&field, 400.0, 300.0, 800.0, 600.0, Resampling::Bilinear), Some(7.0));
    }

    #[test]
    fn test_blend_over() {
        let base = Rgba([0, 0, 0, 255]);
        assert_eq!(blend_over(base, Color::WHITE, 1.0), Rgba([255, 255, 255, 255]));
        assert_eq!(blend_over(base, Color::WHITE, 0.0), base);
        assert_eq!(blend_over(base, Color::WHITE, 0.5), Rgba([128, 128, 128, 255]));

        let clear = Rgba([0, 0, 0, 0]);
        assert_eq!(blend_over(clear, Color::new(10, 20, 30, 255), 0.5), Rgba([10, 20, 30, 128]));
    }
}
