//! On-disk fixtures for survey heatmap tests.
//!
//! Tables are written with the same header layout the capture tools
//! produce, and base rasters are solid-color PNGs.

use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};
use survey_common::Dataset;
use tempfile::TempDir;

/// Header row written by the capture tools.
pub const SURVEY_HEADER: [&str; 8] = [
    "Timestamp",
    "Download_Mbps",
    "Upload_Mbps",
    "Ping_ms",
    "RSSI_dBm",
    "Latitude",
    "Longitude",
    "Note",
];

/// Raster size used by the campus map.
pub const MAP_WIDTH: u32 = 800;
pub const MAP_HEIGHT: u32 = 600;

/// Create a fresh temporary directory for a test.
pub fn survey_workspace() -> TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}

/// Write a table with an arbitrary header and rows.
pub fn write_table(dir: &Path, name: &str, header: &[&str], rows: &[Vec<String>]) -> PathBuf {
    let path = dir.join(name);
    let mut writer = csv::Writer::from_path(&path).expect("failed to create table");
    writer.write_record(header).expect("failed to write header");
    for row in rows {
        writer.write_record(row).expect("failed to write row");
    }
    writer.flush().expect("failed to flush table");
    path
}

/// Write a dataset using the standard survey header.
pub fn write_dataset_csv(dir: &Path, name: &str, dataset: &Dataset) -> PathBuf {
    let fmt = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
    let rows: Vec<Vec<String>> = dataset
        .iter()
        .map(|r| {
            vec![
                r.timestamp.clone(),
                fmt(r.download),
                fmt(r.upload),
                fmt(r.ping),
                fmt(r.rssi),
                r.pixel_x.to_string(),
                r.pixel_y.to_string(),
                r.note.clone(),
            ]
        })
        .collect();
    write_table(dir, name, &SURVEY_HEADER, &rows)
}

/// Write a solid-color base raster PNG.
pub fn write_base_raster(dir: &Path, name: &str, width: u32, height: u32, rgba: [u8; 4]) -> PathBuf {
    let path = dir.join(name);
    RgbaImage::from_pixel(width, height, Rgba(rgba))
        .save(&path)
        .expect("failed to write base raster");
    path
}

/// Write a light grey campus-sized base raster.
pub fn write_campus_map(dir: &Path) -> PathBuf {
    write_base_raster(dir, "komabamap.png", MAP_WIDTH, MAP_HEIGHT, [230, 230, 230, 255])
}
