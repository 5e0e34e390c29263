//! Survey heatmap command-line tool.
//!
//! Renders one heatmap per invocation from a YAML configuration, with
//! `HEATMAP_*` environment variables and flags layered on top.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use heatmap::{run, ConfigOverrides, HeatmapConfig};

#[derive(Parser, Debug)]
#[command(name = "heatmap")]
#[command(about = "Render a Wi-Fi survey heatmap over a base map")]
struct Args {
    /// Configuration file path (defaults are used when omitted)
    #[arg(short, long, env = "HEATMAP_CONFIG")]
    config: Option<PathBuf>,

    /// Value to map: Download_Mbps, Upload_Mbps, Ping_ms or RSSI_dBm
    #[arg(short, long)]
    value_field: Option<String>,

    /// Scattered interpolation method: nearest, linear or cubic
    #[arg(short, long)]
    method: Option<String>,

    /// Use radial influence with this Gaussian sigma in pixels
    #[arg(long)]
    sigma: Option<f64>,

    /// Grid samples per axis
    #[arg(short, long)]
    resolution: Option<usize>,

    /// Directory for the image and legend
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Draw measurement points on top of the field
    #[arg(long)]
    overlay_points: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level, &args.log_format)?;

    let mut config = match &args.config {
        Some(path) => HeatmapConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => HeatmapConfig::default(),
    };

    config
        .apply_env_overrides()
        .context("Invalid HEATMAP_* environment override")?;
    config
        .apply_overrides(&ConfigOverrides {
            value_field: args.value_field.clone(),
            method: args.method.clone(),
            sigma: args.sigma,
            resolution: args.resolution,
            output_dir: args.output_dir.clone(),
            overlay_points: args.overlay_points,
        })
        .context("Invalid command-line option")?;

    info!(
        value_field = %config.value_field,
        estimator = config.estimator.kind(),
        sources = config.sources.len(),
        "Starting heatmap run"
    );

    let report = run(&config).context("Heatmap run failed")?;

    println!("{}", report.output_path.display());
    if let Some(legend) = &report.legend_path {
        println!("{}", legend.display());
    }

    Ok(())
}

fn init_tracing(log_level: &str, log_format: &str) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    if log_format.eq_ignore_ascii_case("json") {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    Ok(())
}
