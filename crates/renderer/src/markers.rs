//! Source point markers.

use image::RgbaImage;
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_circle_mut};
use survey_common::Sample;

use crate::colormap::{Color, Colormap};
use crate::composite::flip_y;
use crate::options::Origin;
use crate::scale::ValueScale;

/// Radius of the filled dot.
pub const MARKER_RADIUS: i32 = 4;

/// Radius of the white ring drawn around each dot.
pub const MARKER_RING_RADIUS: i32 = 5;

/// Raster pixel of a data position.
pub fn marker_position(sample: &Sample, height: f64, origin: Origin) -> (i32, i32) {
    let y = flip_y(sample.y, height, origin);
    (sample.x.round() as i32, y.round() as i32)
}

/// Draw one marker per sample, later samples on top.
///
/// Dots take the colormap color of the sample's value; markers outside the
/// canvas are clipped.
pub fn draw_markers(
    canvas: &mut RgbaImage,
    samples: &[Sample],
    scale: &ValueScale,
    colormap: &Colormap,
    origin: Origin,
) {
    let height = canvas.height() as f64;

    for sample in samples {
        let center = marker_position(sample, height, origin);
        let fill = colormap.color_at(scale.normalize(sample.value));
        draw_filled_circle_mut(canvas, center, MARKER_RADIUS, fill.to_rgba());
        draw_hollow_circle_mut(canvas, center, MARKER_RING_RADIUS, Color::WHITE.to_rgba());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_marker_drawn_at_position() {
        let mut canvas = RgbaImage::from_pixel(40, 40, Rgba([0, 0, 0, 255]));
        let samples = [Sample {
            x: 20.0,
            y: 10.0,
            value: 1.0,
        }];
        let greys = Colormap::named("greys").unwrap();
        draw_markers(&mut canvas, &samples, &ValueScale::new(0.0, 1.0), &greys, Origin::Upper);

        // Value 1.0 is black in greys; the ring is white.
        assert_eq!(canvas.get_pixel(20, 10), &Rgba([0, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(25, 10), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_lower_origin_flips_marker() {
        let sample = Sample {
            x: 5.0,
            y: 10.0,
            value: 0.0,
        };
        assert_eq!(marker_position(&sample, 100.0, Origin::Upper), (5, 10));
        assert_eq!(marker_position(&sample, 100.0, Origin::Lower), (5, 90));
    }

    #[test]
    fn test_offscreen_marker_is_clipped() {
        let mut canvas = RgbaImage::from_pixel(10, 10, Rgba([1, 2, 3, 255]));
        let samples = [Sample {
            x: 500.0,
            y: 500.0,
            value: 0.5,
        }];
        let viridis = Colormap::named("viridis").unwrap();
        draw_markers(&mut canvas, &samples, &ValueScale::new(0.0, 1.0), &viridis, Origin::Upper);
        assert!(canvas.pixels().all(|p| *p == Rgba([1, 2, 3, 255])));
    }
}
