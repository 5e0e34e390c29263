//! Tests for PNG encoding functionality.
//!
//! Tests the indexed PNG and RGBA PNG encoders, including:
//! - PNG format selection (auto mode)
//! - Decodability of both color types
//! - Byte-identical output for identical input

use image::{Rgba, RgbaImage};
use renderer::encode_png;
use renderer::png::{encode_auto, encode_indexed, encode_rgba, Palette};

/// Offset of the IHDR color type byte.
const COLOR_TYPE_OFFSET: usize = 25;

// ============================================================================
// Helper functions
// ============================================================================

/// Heatmap-like pixels: a horizontal ramp quantized to `levels` colors.
fn ramp_pixels(width: usize, height: usize, levels: usize) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(width * height * 4);
    for _ in 0..height {
        for x in 0..width {
            let level = (x * levels / width) as u8;
            pixels.extend_from_slice(&[level, 255 - level, 128, 255]);
        }
    }
    pixels
}

/// Pixels with a distinct color at every position.
fn unique_pixels(width: usize, height: usize) -> Vec<u8> {
    (0..width * height)
        .flat_map(|i| [(i % 256) as u8, (i / 256) as u8, 7, 255])
        .collect()
}

// ============================================================================
// Basic PNG creation tests
// ============================================================================

#[test]
fn test_create_png_signature() {
    let pixels = [
        255, 0, 0, 255, // red
        0, 255, 0, 255, // green
        0, 255, 0, 255, // green
        255, 0, 0, 255, // red
    ];

    let png = encode_rgba(&pixels, 2, 2).unwrap();
    assert_eq!(&png[0..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
    assert_eq!(&png[12..16], b"IHDR");
    assert_eq!(png[COLOR_TYPE_OFFSET], 6);
    assert_eq!(&png[png.len() - 8..png.len() - 4], b"IEND");
}

#[test]
fn test_indexed_png_with_transparency_decodes() {
    let palette = Palette::from_entries(vec![[255, 0, 0, 255], [0, 0, 0, 0]]);
    let indices = [0, 1, 1, 0];
    let png = encode_indexed(2, 2, &palette, &indices).unwrap();
    assert_eq!(png[COLOR_TYPE_OFFSET], 3);

    let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(decoded.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
    assert_eq!(decoded.get_pixel(1, 0)[3], 0);
}

// ============================================================================
// Format selection tests
// ============================================================================

#[test]
fn test_auto_uses_indexed_for_few_colors() {
    let pixels = ramp_pixels(64, 16, 20);
    let png = encode_auto(&pixels, 64, 16).unwrap();
    assert_eq!(png[COLOR_TYPE_OFFSET], 3);

    let rgba = encode_rgba(&pixels, 64, 16).unwrap();
    assert!(png.len() < rgba.len());
}

#[test]
fn test_auto_falls_back_to_rgba() {
    let pixels = unique_pixels(30, 10);
    let png = encode_auto(&pixels, 30, 10).unwrap();
    assert_eq!(png[COLOR_TYPE_OFFSET], 6);
}

#[test]
fn test_auto_output_decodes_to_input() {
    for pixels in [ramp_pixels(40, 8, 10), unique_pixels(40, 8)] {
        let png = encode_auto(&pixels, 40, 8).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded.as_raw(), &pixels);
    }
}

// ============================================================================
// Determinism tests
// ============================================================================

#[test]
fn test_encoding_is_deterministic() {
    let image = RgbaImage::from_fn(50, 40, |x, y| Rgba([(x * 5) as u8, (y * 6) as u8, 90, 255]));
    assert_eq!(encode_png(&image).unwrap(), encode_png(&image).unwrap());
}
