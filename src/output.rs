//! Output formatting and export for review data.
//!
//! Supports pretty-printing, JSON serialization, and CSV export.

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

use crate::models::DetectionRecord;
use crate::stats::ReviewStats;
use csv::WriterBuilder;
use std::fs::File;
use std::io::Write;

/// Logs review statistics using Rust's debug pretty-print format.
pub fn print_pretty(stats: &ReviewStats) {
    debug!("{:#?}", stats);
}

/// Logs any serializable value as pretty-printed JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// One spreadsheet row per record, flattened for CSV.
#[derive(Debug, Serialize)]
struct RecordRow<'a> {
    id: &'a str,
    name: &'a str,
    category: &'a str,
    status: &'a str,
    process_status: &'a str,
    event_status: &'a str,
    date_captured: String,
    latitude: f64,
    longitude: f64,
    confidence: f64,
    level: i32,
    frame: Option<i64>,
    image_url: Option<&'a str>,
    infra_object_id: Option<&'a str>,
}

impl<'a> From<&'a DetectionRecord> for RecordRow<'a> {
    fn from(r: &'a DetectionRecord) -> Self {
        Self {
            id: &r.id,
            name: &r.name,
            category: r.category.as_str(),
            status: r.status.as_str(),
            process_status: r.process_status.as_str(),
            event_status: r.event_status.as_str(),
            date_captured: r.date_captured.format("%Y-%m-%d %H:%M:%S").to_string(),
            latitude: r.latitude,
            longitude: r.longitude,
            confidence: r.confidence,
            level: r.level,
            frame: r.video_frame(),
            image_url: r.image_url(),
            infra_object_id: r.infra_object.as_ref().map(|o| o.id.as_str()),
        }
    }
}

/// Writes `records` as CSV with a header row.
pub fn write_records_to<W: Write>(writer: W, records: &[DetectionRecord]) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(writer);
    for record in records {
        writer.serialize(RecordRow::from(record))?;
    }
    writer.flush()?;
    Ok(())
}

/// Exports `records` to a CSV file at `path`, replacing any existing file.
pub fn write_records(path: &str, records: &[DetectionRecord]) -> Result<()> {
    debug!(path, count = records.len(), "Writing CSV export");
    let file = File::create(path)?;
    write_records_to(file, records)?;
    info!(path, count = records.len(), "Records exported");
    Ok(())
}
