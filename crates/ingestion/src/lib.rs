//! Survey table ingestion.
//!
//! Loads measurement records from one or more CSV tables into a single
//! [`Dataset`](survey_common::Dataset):
//!
//! - Columns are matched by name, never by position
//! - Per-source header renames are supplied explicitly by the caller
//! - Missing tables are skipped; the load fails only when none remain
//! - Rows missing a required column are dropped and counted

pub mod schema;
pub mod store;

// Re-exports
pub use schema::{Column, SchemaMapping};
pub use store::{LoadReport, LoadedDataset, RecordStore, SkippedSource, SourceSpec};
pub use survey_common::{SurveyError, SurveyResult};
