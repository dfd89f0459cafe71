//! Persistence and printing of dashboard snapshots.
//!
//! Supports pretty-printed JSON logging and CSV append of a one-row summary
//! per refresh.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::OpenOptions;
use std::path::Path;
use tracing::{debug, info};

use crate::analyzers::snapshot::DashboardSnapshot;

/// One CSV row summarising a refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotRecord {
    pub timestamp: DateTime<Utc>,
    pub range_start: Option<NaiveDate>,
    pub range_end: Option<NaiveDate>,
    pub total_trips: usize,
    pub avg_fare: Option<f64>,
    pub avg_distance: Option<f64>,
    pub avg_speed: Option<f64>,
    pub pages_fetched: u32,
    pub truncated: bool,
}

impl SnapshotRecord {
    pub fn from_snapshot(snapshot: &DashboardSnapshot, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            range_start: snapshot.range.map(|r| r.start),
            range_end: snapshot.range.map(|r| r.end),
            total_trips: snapshot.stats.total_trips,
            avg_fare: snapshot.stats.avg_fare,
            avg_distance: snapshot.stats.avg_distance,
            avg_speed: snapshot.stats.avg_speed,
            pages_fetched: snapshot.pages_fetched,
            truncated: snapshot.truncated,
        }
    }
}

/// Logs the full snapshot as pretty-printed JSON.
pub fn print_json(snapshot: &DashboardSnapshot) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(snapshot)?);
    Ok(())
}

/// Appends a [`SnapshotRecord`] as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_snapshot(path: &str, record: &SnapshotRecord) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending snapshot record");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);

    writer.serialize(record)?;
    writer.flush()?;

    Ok(())
}
