//! Output formatting and persistence for station traffic.
//!
//! Supports pretty-printing, JSON files, and CSV files.

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

use crate::model::StationTraffic;
use csv::WriterBuilder;
use std::fs::File;

/// Logs a value using Rust's debug pretty-print format.
pub fn print_pretty<T: std::fmt::Debug>(value: &T) {
    debug!("{:#?}", value);
}

/// Logs a value as pretty-printed JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Writes annotated stations to a CSV file, replacing any existing contents.
pub fn write_csv(path: &str, rows: &[StationTraffic]) -> Result<()> {
    debug!(path, rows = rows.len(), "Writing CSV");

    let file = File::create(path)?;
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);

    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

/// Writes any serializable value to `path` as pretty-printed JSON.
pub fn write_json<T: Serialize>(path: &str, value: &T) -> Result<()> {
    debug!(path, "Writing JSON");
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, value)?;
    Ok(())
}
