use anyhow::{Context, Result};
use chrono::Duration;
use chrono_tz::Tz;
use serde::Deserialize;

/// Knobs for the aggregation pipeline.
///
/// Stored as a JSON object on disk, every field optional:
/// ```json
/// {
///   "timezone": "America/New_York",
///   "recency_threshold_minutes": 10,
///   "trailing_days": 31,
///   "top_routes": 10,
///   "page_size": 1000
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Civil timezone used for every day and hour bucket.
    pub timezone: Tz,
    /// Alerts seen within this many minutes of "now" are active.
    pub recency_threshold_minutes: i64,
    /// Keep only this many most recent days of the dense daily series.
    /// `0` or `null` keeps every day.
    pub trailing_days: Option<usize>,
    /// Length of the route ranking.
    pub top_routes: usize,
    /// Rows requested per page from the alert store.
    pub page_size: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::America::New_York,
            recency_threshold_minutes: 10,
            trailing_days: Some(31),
            top_routes: 10,
            page_size: 1000,
        }
    }
}

impl ReportConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config '{path}'"))?;
        let config: ReportConfig = serde_json::from_str(&content)
            .with_context(|| format!("invalid config '{path}'"))?;
        Ok(config)
    }

    pub fn recency_threshold(&self) -> Duration {
        Duration::minutes(self.recency_threshold_minutes)
    }
}
