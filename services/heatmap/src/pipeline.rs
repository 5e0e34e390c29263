//! End-to-end heatmap run.
//!
//! Every fatal condition is detected before the output directory is
//! touched. Both outputs are encoded in memory and staged on disk before
//! either is renamed into place.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use field_estimator::{Estimate, EstimatorConfig};
use ingestion::{Column, RecordStore};
use renderer::{encode_png, load_base_raster, write_all_atomic, Renderer};
use survey_common::{Dataset, EvaluationGrid, GridBuilder, SurveyError, ValueField};

use crate::config::HeatmapConfig;
use crate::error::{HeatmapError, Result};

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub output_path: PathBuf,
    /// `None` when nothing could be colored.
    pub legend_path: Option<PathBuf>,
    pub records_used: usize,
    pub rows_dropped: usize,
    pub sources_skipped: usize,
    /// Name of the estimator that produced the drawn field.
    pub estimator: String,
    pub undefined_cells: usize,
    pub fallback_used: bool,
    pub warnings: Vec<String>,
}

/// Load, estimate, render and write one heatmap.
pub fn run(config: &HeatmapConfig) -> Result<RunReport> {
    config.validate().map_err(HeatmapError::Config)?;

    if !config.base_raster.is_file() {
        return Err(SurveyError::MissingBaseRaster {
            path: config.base_raster.clone(),
        }
        .into());
    }
    let base = load_base_raster(&config.base_raster)?;
    let renderer = Renderer::new(config.render.clone())?;

    let loaded = RecordStore::load(&config.sources, &Column::required_for(config.value_field))?;
    if loaded.dataset.is_empty() {
        return Err(HeatmapError::EmptyDataset {
            value_field: config.value_field,
            sources: loaded.report.sources_loaded,
        });
    }

    let grid = GridBuilder::build(base.width(), base.height(), config.estimator.resolution())?;
    info!(
        value_field = %config.value_field,
        records = loaded.dataset.len(),
        rows = grid.rows(),
        cols = grid.cols(),
        "Estimating field"
    );

    let outcome = estimate_with_fallback(config, &grid, &loaded.dataset)?;
    let samples = loaded.dataset.samples(config.value_field);
    let rendered = renderer.render(&base, &outcome.estimate.field, &samples)?;

    let png = encode_png(&rendered.image)?;
    let legend = rendered
        .scale
        .map(|scale| {
            renderer
                .legend_spec(&scale, config.value_field.column_name(), config.value_field.units())
                .to_json()
        })
        .transpose()?;

    fs::create_dir_all(&config.output_dir)?;
    let output_path = config.output_path();
    let legend_path = legend.as_ref().map(|_| config.legend_path());

    // The legend goes first so a heatmap on disk always has its legend.
    let mut files: Vec<(&Path, &[u8])> = Vec::with_capacity(2);
    match (&legend_path, &legend) {
        (Some(path), Some(bytes)) => files.push((path.as_path(), bytes.as_slice())),
        _ => warn!("Field and samples carry no values; legend omitted"),
    }
    files.push((output_path.as_path(), png.as_slice()));
    write_all_atomic(&files)?;

    let report = RunReport {
        output_path,
        legend_path,
        records_used: samples.len(),
        rows_dropped: loaded.report.rows_dropped,
        sources_skipped: loaded.report.skipped.len(),
        estimator: outcome.estimator,
        undefined_cells: outcome.estimate.field.undefined_count(),
        fallback_used: outcome.fallback_used,
        warnings: outcome.estimate.warnings.iter().map(ToString::to_string).collect(),
    };

    info!(
        output = %report.output_path.display(),
        records = report.records_used,
        dropped = report.rows_dropped,
        skipped_sources = report.sources_skipped,
        estimator = %report.estimator,
        undefined_cells = report.undefined_cells,
        fallback = report.fallback_used,
        "Heatmap written"
    );

    Ok(report)
}

struct EstimateOutcome {
    estimate: Estimate,
    estimator: String,
    fallback_used: bool,
}

fn estimate_with(
    config: &EstimatorConfig,
    grid: &EvaluationGrid,
    dataset: &Dataset,
    value_field: ValueField,
) -> Result<(Estimate, String)> {
    let estimator = config.build()?;
    let name = estimator.name();
    let estimate = estimator.estimate(grid, dataset, value_field)?;
    for warning in &estimate.warnings {
        warn!(estimator = %name, warning = %warning, "Estimator warning");
    }
    Ok((estimate, name))
}

/// Run the configured estimator, retrying once with the fallback when the
/// dataset is degenerate for it.
fn estimate_with_fallback(
    config: &HeatmapConfig,
    grid: &EvaluationGrid,
    dataset: &Dataset,
) -> Result<EstimateOutcome> {
    let (estimate, name) = estimate_with(&config.estimator, grid, dataset, config.value_field)?;

    let fallback = config
        .degenerate_fallback
        .estimator(config.estimator.resolution())
        .filter(|_| estimate.is_degenerate());

    match fallback {
        Some(fallback) => {
            info!(from = %name, to = fallback.kind(), "Dataset degenerate, retrying with fallback estimator");
            let (estimate, estimator) = estimate_with(&fallback, grid, dataset, config.value_field)?;
            Ok(EstimateOutcome {
                estimate,
                estimator,
                fallback_used: true,
            })
        }
        None => Ok(EstimateOutcome {
            estimate,
            estimator: name,
            fallback_used: false,
        }),
    }
}
