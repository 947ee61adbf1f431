//! Output formatting and CSV export for report series.

use anyhow::{Context, Result};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

use crate::analyzers::types::{DayCount, HourBucket};

/// Logs a report using Rust's debug pretty-print format.
pub fn print_pretty(report: &impl std::fmt::Debug) {
    debug!("{:#?}", report);
}

/// Logs a report as pretty-printed JSON.
pub fn print_json(report: &impl Serialize) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Writes rows to a CSV file with a header, replacing any existing file.
pub fn write_csv<T: Serialize>(path: impl AsRef<Path>, rows: &[T]) -> Result<()> {
    let path = path.as_ref();
    let file =
        File::create(path).with_context(|| format!("failed to create '{}'", path.display()))?;

    let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    debug!(path = %path.display(), rows = rows.len(), "Wrote CSV");
    Ok(())
}

/// Exports the dense daily series as `date,label,count` rows.
pub fn write_daily_csv(path: impl AsRef<Path>, series: &[DayCount]) -> Result<()> {
    write_csv(&path, series)?;
    info!(path = %path.as_ref().display(), days = series.len(), "Exported daily counts");
    Ok(())
}

/// Exports an hour-of-day series as `hour,count,days_observed,average` rows.
pub fn write_hourly_csv(path: impl AsRef<Path>, buckets: &[HourBucket]) -> Result<()> {
    write_csv(&path, buckets)?;
    info!(path = %path.as_ref().display(), "Exported hourly distribution");
    Ok(())
}
