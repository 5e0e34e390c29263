//! Record store: CSV tables into a validated dataset.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use survey_common::{rssi_from_signal_percent, Dataset, MeasurementRecord, SurveyError, SurveyResult};

use crate::schema::{Column, SchemaMapping};

/// One input table and the header mapping to apply to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSpec {
    pub path: PathBuf,
    #[serde(default)]
    pub renames: SchemaMapping,
}

impl SourceSpec {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            renames: SchemaMapping::default(),
        }
    }

    pub fn with_renames(mut self, renames: SchemaMapping) -> Self {
        self.renames = renames;
        self
    }
}

/// A source that contributed no records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedSource {
    pub path: PathBuf,
    pub reason: String,
}

/// Counters collected while loading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub sources_loaded: usize,
    pub skipped: Vec<SkippedSource>,
    pub rows_read: usize,
    pub rows_dropped: usize,
}

/// The dataset plus what happened while building it.
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub dataset: Dataset,
    pub report: LoadReport,
}

/// Loads survey tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordStore;

impl RecordStore {
    /// Load and concatenate `sources` in order, dropping rows that lack
    /// any of `required`.
    ///
    /// Missing or unreadable sources are skipped. Fails with
    /// [`SurveyError::NoData`] when no source could be loaded.
    pub fn load(sources: &[SourceSpec], required: &[Column]) -> SurveyResult<LoadedDataset> {
        let mut dataset = Dataset::default();
        let mut report = LoadReport::default();

        for source in sources {
            match Self::load_source(source, required) {
                Ok(loaded) => {
                    report.sources_loaded += 1;
                    report.rows_read += loaded.report.rows_read;
                    report.rows_dropped += loaded.report.rows_dropped;
                    dataset.extend(loaded.dataset);
                }
                Err(e) if e.is_recoverable() => {
                    warn!(path = %source.path.display(), error = %e, "Skipping source");
                    report.skipped.push(SkippedSource {
                        path: source.path.clone(),
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        if report.sources_loaded == 0 {
            return Err(SurveyError::NoData {
                attempted: sources.len(),
            });
        }

        if report.rows_dropped > 0 {
            warn!(
                dropped = report.rows_dropped,
                read = report.rows_read,
                "Dropped rows with missing required values"
            );
        }

        info!(
            sources = report.sources_loaded,
            skipped = report.skipped.len(),
            records = dataset.len(),
            "Loaded survey dataset"
        );

        Ok(LoadedDataset { dataset, report })
    }

    /// Load a single source.
    pub fn load_source(source: &SourceSpec, required: &[Column]) -> SurveyResult<LoadedDataset> {
        let path = source.path.as_path();
        if !path.is_file() {
            return Err(SurveyError::MissingSource {
                path: path.to_path_buf(),
            });
        }

        for target in source.renames.unknown_targets() {
            warn!(path = %path.display(), target = %target, "Rename target is not a known column");
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| csv_error(path, e))?;

        let headers: Vec<String> = reader
            .byte_headers()
            .map_err(|e| csv_error(path, e))?
            .iter()
            .map(|h| String::from_utf8_lossy(h).into_owned())
            .collect();
        for unmatched in source.renames.unmatched_sources(headers.iter().map(String::as_str)) {
            warn!(path = %path.display(), header = %unmatched, "Renamed header not present in source");
        }

        let positions = source.renames.resolve(headers.iter().map(String::as_str));
        check_required(path, &positions, required)?;

        let mut records = Vec::new();
        let mut report = LoadReport {
            sources_loaded: 1,
            ..Default::default()
        };

        // Rows are decoded field by field so one badly encoded cell only
        // costs its own row.
        for row in reader.byte_records() {
            let parsed = match row {
                Ok(row) => {
                    let line = row.position().map(|p| p.line()).unwrap_or(0);
                    parse_row(&row, &positions, required).map_err(|reason| (line, reason))
                }
                Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => return Err(csv_error(path, e)),
                Err(e) => {
                    let line = e.position().map(|p| p.line()).unwrap_or(0);
                    Err((line, e.to_string()))
                }
            };
            report.rows_read += 1;

            match parsed {
                Ok(record) => records.push(record),
                Err((line, reason)) => {
                    report.rows_dropped += 1;
                    let e = SurveyError::InvalidRecord {
                        path: path.to_path_buf(),
                        line,
                        reason,
                    };
                    debug!(error = %e, "Dropping row");
                }
            }
        }

        debug!(path = %path.display(), rows = report.rows_read, kept = records.len(), "Loaded source");

        Ok(LoadedDataset {
            dataset: Dataset::new(records),
            report,
        })
    }
}

fn csv_error(path: &Path, err: csv::Error) -> SurveyError {
    SurveyError::Csv(format!("{}: {}", path.display(), err))
}

/// RSSI is satisfied by either the dBm column or a signal percentage.
fn check_required(
    path: &Path,
    positions: &HashMap<Column, usize>,
    required: &[Column],
) -> SurveyResult<()> {
    for &column in required {
        let present = positions.contains_key(&column)
            || (column == Column::Rssi && positions.contains_key(&Column::SignalPercent));
        if !present {
            return Err(SurveyError::Schema {
                path: path.to_path_buf(),
                column: column.header().to_string(),
            });
        }
    }
    Ok(())
}

/// Free-text columns are decoded lossily; numeric columns must be valid
/// UTF-8 to count as present.
fn parse_row(
    row: &csv::ByteRecord,
    positions: &HashMap<Column, usize>,
    required: &[Column],
) -> Result<MeasurementRecord, String> {
    let raw = |column: Column| -> Option<&[u8]> { positions.get(&column).and_then(|&idx| row.get(idx)) };
    let text = |column: Column| -> Option<String> {
        raw(column)
            .map(|bytes| String::from_utf8_lossy(bytes).trim().to_string())
            .filter(|s| !s.is_empty())
    };
    let number = |column: Column| -> Option<f64> {
        raw(column)
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
    };

    let rssi = number(Column::Rssi).or_else(|| number(Column::SignalPercent).map(rssi_from_signal_percent));

    for &column in required {
        let present = match column {
            Column::Rssi => rssi.is_some(),
            Column::Timestamp | Column::Note => text(column).is_some(),
            _ => number(column).is_some(),
        };
        if !present {
            return Err(format!("missing or non-numeric '{}'", column.header()));
        }
    }

    let pixel_x = number(Column::PixelX).ok_or_else(|| "missing 'Latitude'".to_string())?;
    let pixel_y = number(Column::PixelY).ok_or_else(|| "missing 'Longitude'".to_string())?;

    Ok(MeasurementRecord {
        pixel_x,
        pixel_y,
        download: number(Column::Download),
        upload: number(Column::Upload),
        ping: number(Column::Ping),
        rssi,
        note: text(Column::Note).unwrap_or_default(),
        timestamp: text(Column::Timestamp).unwrap_or_default(),
    })
}
