//! Measurement records and the in-memory dataset built from them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::SurveyError;

/// The measured quantity a heatmap is estimated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueField {
    #[serde(rename = "Download_Mbps")]
    Download,
    #[serde(rename = "Upload_Mbps")]
    Upload,
    #[serde(rename = "Ping_ms")]
    Ping,
    #[serde(rename = "RSSI_dBm")]
    Rssi,
}

impl Default for ValueField {
    fn default() -> Self {
        Self::Download
    }
}

impl ValueField {
    /// Canonical table column holding this value.
    pub fn column_name(&self) -> &'static str {
        match self {
            Self::Download => "Download_Mbps",
            Self::Upload => "Upload_Mbps",
            Self::Ping => "Ping_ms",
            Self::Rssi => "RSSI_dBm",
        }
    }

    /// Unit label for display.
    pub fn units(&self) -> &'static str {
        match self {
            Self::Download | Self::Upload => "Mbps",
            Self::Ping => "ms",
            Self::Rssi => "dBm",
        }
    }

    pub fn all() -> [ValueField; 4] {
        [Self::Download, Self::Upload, Self::Ping, Self::Rssi]
    }
}

impl FromStr for ValueField {
    type Err = SurveyError;

    /// Accepts the canonical column name or a short alias, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "download_mbps" | "download" => Ok(Self::Download),
            "upload_mbps" | "upload" => Ok(Self::Upload),
            "ping_ms" | "ping" => Ok(Self::Ping),
            "rssi_dbm" | "rssi" => Ok(Self::Rssi),
            _ => Err(SurveyError::UnknownValueField(s.to_string())),
        }
    }
}

impl fmt::Display for ValueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// One row of a survey table.
///
/// `pixel_x`/`pixel_y` are raw pixel coordinates on the base raster
/// (origin top-left). They are stored under the `Latitude`/`Longitude`
/// headers by the capture tools but are never treated as geographic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    pub pixel_x: f64,
    pub pixel_y: f64,
    pub download: Option<f64>,
    pub upload: Option<f64>,
    pub ping: Option<f64>,
    pub rssi: Option<f64>,
    pub note: String,
    pub timestamp: String,
}

impl MeasurementRecord {
    /// Convenience constructor for a record carrying only a download speed.
    pub fn at(pixel_x: f64, pixel_y: f64, download: f64) -> Self {
        Self {
            pixel_x,
            pixel_y,
            download: Some(download),
            upload: None,
            ping: None,
            rssi: None,
            note: String::new(),
            timestamp: String::new(),
        }
    }

    /// Get the value of the given field, if present.
    pub fn value(&self, field: ValueField) -> Option<f64> {
        match field {
            ValueField::Download => self.download,
            ValueField::Upload => self.upload,
            ValueField::Ping => self.ping,
            ValueField::Rssi => self.rssi,
        }
    }

    /// Set the value of the given field.
    pub fn with_value(mut self, field: ValueField, value: Option<f64>) -> Self {
        match field {
            ValueField::Download => self.download = value,
            ValueField::Upload => self.upload = value,
            ValueField::Ping => self.ping = value,
            ValueField::Rssi => self.rssi = value,
        }
        self
    }
}

/// A source point handed to an estimator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

/// Ordered collection of measurement records.
///
/// Order does not affect estimation but is the draw order for point
/// overlays.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<MeasurementRecord>,
}

impl Dataset {
    pub fn new(records: Vec<MeasurementRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[MeasurementRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MeasurementRecord> {
        self.records.iter()
    }

    /// Append another dataset, preserving order.
    pub fn extend(&mut self, other: Dataset) {
        self.records.extend(other.records);
    }

    /// Source points for the given field, in dataset order.
    ///
    /// Records without a finite value for `field` are skipped.
    pub fn samples(&self, field: ValueField) -> Vec<Sample> {
        self.records
            .iter()
            .filter_map(|r| {
                let value = r.value(field)?;
                if !value.is_finite() || !r.pixel_x.is_finite() || !r.pixel_y.is_finite() {
                    return None;
                }
                Some(Sample {
                    x: r.pixel_x,
                    y: r.pixel_y,
                    value,
                })
            })
            .collect()
    }

    /// Min and max of the given field over the dataset.
    pub fn value_range(&self, field: ValueField) -> Option<(f64, f64)> {
        self.samples(field).iter().fold(None, |acc, s| match acc {
            None => Some((s.value, s.value)),
            Some((lo, hi)) => Some((lo.min(s.value), hi.max(s.value))),
        })
    }
}

impl FromIterator<MeasurementRecord> for Dataset {
    fn from_iter<I: IntoIterator<Item = MeasurementRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Convert a wireless adapter signal quality percentage to dBm.
///
/// Uses the linear mapping 0% = -100 dBm, 100% = -50 dBm, rounded to two
/// decimals.
pub fn rssi_from_signal_percent(percent: f64) -> f64 {
    let rssi = (percent / 100.0) * 50.0 - 100.0;
    (rssi * 100.0).round() / 100.0
}
