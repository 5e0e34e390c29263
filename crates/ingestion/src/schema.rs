//! Column schema and explicit header mapping.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use survey_common::ValueField;

/// Canonical survey table columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Column {
    Timestamp,
    Download,
    Upload,
    Ping,
    Rssi,
    /// Raster X pixel, stored under the `Latitude` header.
    PixelX,
    /// Raster Y pixel, stored under the `Longitude` header.
    PixelY,
    Note,
    /// Adapter signal quality in percent, converted to dBm when `RSSI_dBm`
    /// is empty.
    SignalPercent,
}

impl Column {
    /// Canonical header name.
    pub fn header(&self) -> &'static str {
        match self {
            Column::Timestamp => "Timestamp",
            Column::Download => "Download_Mbps",
            Column::Upload => "Upload_Mbps",
            Column::Ping => "Ping_ms",
            Column::Rssi => "RSSI_dBm",
            Column::PixelX => "Latitude",
            Column::PixelY => "Longitude",
            Column::Note => "Note",
            Column::SignalPercent => "Signal_Percent",
        }
    }

    pub fn all() -> [Column; 9] {
        [
            Column::Timestamp,
            Column::Download,
            Column::Upload,
            Column::Ping,
            Column::Rssi,
            Column::PixelX,
            Column::PixelY,
            Column::Note,
            Column::SignalPercent,
        ]
    }

    pub fn from_header(header: &str) -> Option<Column> {
        Column::all().into_iter().find(|c| c.header() == header)
    }

    /// Column holding the given value field.
    pub fn for_value(field: ValueField) -> Column {
        match field {
            ValueField::Download => Column::Download,
            ValueField::Upload => Column::Upload,
            ValueField::Ping => Column::Ping,
            ValueField::Rssi => Column::Rssi,
        }
    }

    /// The minimum required set: both spatial columns plus the target.
    pub fn required_for(field: ValueField) -> Vec<Column> {
        vec![Column::PixelX, Column::PixelY, Column::for_value(field)]
    }
}

/// Explicit rename mapping from a source's headers to canonical headers.
///
/// Headers not mentioned are used as-is. Keys are source headers, values
/// are canonical headers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaMapping {
    renames: BTreeMap<String, String>,
}

impl SchemaMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `source` header onto `column`.
    pub fn rename(mut self, source: impl Into<String>, column: Column) -> Self {
        self.renames.insert(source.into(), column.header().to_string());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.renames.is_empty()
    }

    /// Rename targets that are not canonical headers.
    pub fn unknown_targets(&self) -> Vec<String> {
        self.renames
            .values()
            .filter(|target| Column::from_header(target).is_none())
            .cloned()
            .collect()
    }

    /// Rename keys absent from the given headers.
    pub fn unmatched_sources<'a>(&self, headers: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        let present: Vec<&str> = headers.into_iter().collect();
        self.renames
            .keys()
            .filter(|k| !present.contains(&k.as_str()))
            .cloned()
            .collect()
    }

    /// Resolve canonical columns to positions in a header row.
    ///
    /// When two headers resolve to the same column the first wins.
    pub fn resolve<'a>(&self, headers: impl IntoIterator<Item = &'a str>) -> HashMap<Column, usize> {
        let mut positions = HashMap::new();
        for (idx, raw) in headers.into_iter().enumerate() {
            let raw = raw.trim();
            let name = self.renames.get(raw).map(String::as_str).unwrap_or(raw);
            if let Some(column) = Column::from_header(name) {
                positions.entry(column).or_insert(idx);
            }
        }
        positions
    }
}
