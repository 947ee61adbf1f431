//! Trait and types for the store the alerts are read from.

use crate::alert::Alert;
use crate::analyzers::types::RouteCount;
use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use tracing::{error, warn};

/// Inclusive range of `last_seen_time` values to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub since: DateTime<Utc>,
    pub until: DateTime<Utc>,
}

impl TimeWindow {
    /// The `days` days ending at `now`.
    pub fn trailing_days(now: DateTime<Utc>, days: i64) -> Self {
        Self::trailing(now, Duration::days(days))
    }

    pub fn trailing(now: DateTime<Utc>, length: Duration) -> Self {
        Self {
            since: now - length,
            until: now,
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.since <= instant && instant <= self.until
    }
}

/// Read-only access to stored alerts and the aggregates computed beside them.
///
/// Implementations resolve pagination themselves and hand back complete
/// collections.
#[async_trait::async_trait]
pub trait AlertStore: Send + Sync {
    /// Alerts whose `last_seen_time` falls inside `window`.
    async fn fetch_alerts(&self, window: TimeWindow) -> Result<Vec<Alert>>;

    /// Precomputed `(route, count)` pairs, in no particular order.
    async fn fetch_route_counts(&self) -> Result<Vec<RouteCount>>;

    /// Number of alerts ever stored.
    async fn total_alerts(&self) -> Result<u64>;
}

/// Like [`AlertStore::fetch_alerts`], but a failed fetch is logged and read as no alerts.
pub async fn fetch_alerts_or_empty(store: &dyn AlertStore, window: TimeWindow) -> Vec<Alert> {
    store.fetch_alerts(window).await.unwrap_or_else(|e| {
        error!(error = %e, since = %window.since, until = %window.until, "Failed to fetch alerts");
        Vec::new()
    })
}

/// Like [`AlertStore::fetch_route_counts`], falling back to no counts.
pub async fn fetch_route_counts_or_empty(store: &dyn AlertStore) -> Vec<RouteCount> {
    store.fetch_route_counts().await.unwrap_or_else(|e| {
        error!(error = %e, "Failed to fetch route counts");
        Vec::new()
    })
}

/// Like [`AlertStore::total_alerts`], falling back to zero.
pub async fn total_alerts_or_zero(store: &dyn AlertStore) -> u64 {
    store.total_alerts().await.unwrap_or_else(|e| {
        error!(error = %e, "Failed to fetch total alert count");
        0
    })
}

/// Decodes raw store rows one at a time, skipping any that are malformed.
///
/// A row without routes, or with a `last_seen_time` before its
/// `start_time`, counts as malformed.
pub fn decode_rows(rows: Vec<Value>) -> Vec<Alert> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row
                .get("alert_id")
                .or_else(|| row.get("id"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();

            match serde_json::from_value::<Alert>(row) {
                Ok(alert) if alert.routes.is_empty() => {
                    warn!(alert_id = %alert.id, "Skipping alert without routes");
                    None
                }
                Ok(alert) if alert.last_seen_time < alert.start_time => {
                    warn!(alert_id = %alert.id, "Skipping alert last seen before it started");
                    None
                }
                Ok(alert) => Some(alert),
                Err(e) => {
                    warn!(alert_id = %id, error = %e, "Skipping malformed alert row");
                    None
                }
            }
        })
        .collect()
}
