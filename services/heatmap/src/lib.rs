//! Survey heatmap pipeline.
//!
//! Loads survey tables, estimates a scalar field over the base raster and
//! writes the composited image plus a legend descriptor.
//!
//! ```ignore
//! use heatmap::{run, HeatmapConfig};
//!
//! let config = HeatmapConfig::from_file("heatmap.yaml")?;
//! let report = run(&config)?;
//! println!("{}", report.output_path.display());
//! ```

pub mod config;
pub mod error;
pub mod pipeline;

pub use config::{ConfigOverrides, DegenerateFallback, HeatmapConfig};
pub use error::{HeatmapError, Result};
pub use pipeline::{run, RunReport};
