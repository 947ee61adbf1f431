//! Data types produced by the aggregation pipeline.

use crate::alert::Alert;
use crate::classify::{CauseCategory, CauseCount};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Alerts last seen on one civil day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCount {
    pub date: NaiveDate,
    /// Chart label such as `Thu, 5/1`.
    pub label: String,
    pub count: usize,
}

/// Alerts that started in one UTC hour of the day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourBucket {
    pub hour: u32,
    pub count: usize,
    /// Distinct civil days on which this hour saw at least one alert.
    pub days_observed: usize,
    /// `count / days_observed`, or 0.0 for an hour never observed.
    pub average: f64,
}

/// Hour-of-day series over all days and split by weekday/weekend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyDistribution {
    pub all: Vec<HourBucket>,
    pub weekday: Vec<HourBucket>,
    pub weekend: Vec<HourBucket>,
}

/// Precomputed per-route alert count supplied by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteCount {
    pub route: String,
    pub count: u64,
}

/// Past alerts last seen on one civil day, most recent first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayGroup {
    pub date: NaiveDate,
    /// Heading such as `Thu, May 1`.
    pub label: String,
    pub alerts: Vec<Alert>,
}

/// Alerts split by recency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Partition {
    /// Seen within the recency threshold, most recent first.
    pub active: Vec<Alert>,
    /// Everything else, grouped by day, most recent day first.
    pub past: Vec<DayGroup>,
}

/// Dashboard overview: totals, rankings and trend series.
#[derive(Debug, Serialize)]
pub struct MetricsReport {
    pub schema_version: u8,
    pub generated_at: DateTime<Utc>,
    pub lookback_days: i64,
    pub total_alerts: u64,
    pub most_delayed_route: Option<String>,
    pub most_common_cause: Option<CauseCategory>,
    pub route_ranking: Vec<RouteCount>,
    /// `None` when the window contained no alerts.
    pub daily: Option<Vec<DayCount>>,
    pub hourly: HourlyDistribution,
}

/// Cause breakdown with the matching incident list.
#[derive(Debug, Serialize)]
pub struct CausesReport {
    pub schema_version: u8,
    pub generated_at: DateTime<Utc>,
    pub lookback_days: i64,
    pub category: Option<CauseCategory>,
    pub causes: Vec<CauseCount>,
    pub incidents: Vec<Alert>,
}

/// Active delays and recent past incidents.
#[derive(Debug, Serialize)]
pub struct IncidentsReport {
    pub schema_version: u8,
    pub generated_at: DateTime<Utc>,
    pub lookback_days: i64,
    #[serde(flatten)]
    pub partition: Partition,
}
