use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

use crate::alert::Alert;
use crate::analyzers::types::RouteCount;
use crate::services::alert_store::{AlertStore, TimeWindow, decode_rows};

/// On-disk snapshot layout. Either a bare array of alert rows, or:
/// ```json
/// {
///   "alerts": [ { "alert_id": "...", "routes": ["A"], ... } ],
///   "route_counts": [ { "route": "A", "count": 12 } ],
///   "total_alerts": 4012
/// }
/// ```
#[derive(Deserialize)]
#[serde(untagged)]
enum Snapshot {
    Rows(Vec<Value>),
    Full {
        alerts: Vec<Value>,
        #[serde(default)]
        route_counts: Option<Vec<RouteCount>>,
        #[serde(default)]
        total_alerts: Option<u64>,
    },
}

/// Serves alerts from a JSON snapshot held in memory.
///
/// Without precomputed route counts or a total, both are derived from the
/// snapshot's alerts.
pub struct FileStore {
    alerts: Vec<Alert>,
    route_counts: Vec<RouteCount>,
    total_alerts: u64,
}

impl FileStore {
    /// Loads a snapshot from `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read snapshot '{}'", path.display()))?;
        let store = Self::from_json(&content)
            .with_context(|| format!("invalid snapshot '{}'", path.display()))?;
        info!(
            path = %path.display(),
            alerts = store.alerts.len(),
            "Loaded alert snapshot"
        );
        Ok(store)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let (rows, route_counts, total_alerts) = match serde_json::from_str::<Snapshot>(content)? {
            Snapshot::Rows(rows) => (rows, None, None),
            Snapshot::Full {
                alerts,
                route_counts,
                total_alerts,
            } => (alerts, route_counts, total_alerts),
        };

        let alerts = decode_rows(rows);
        let route_counts = route_counts.unwrap_or_else(|| count_routes(&alerts));
        let total_alerts = total_alerts.unwrap_or(alerts.len() as u64);

        Ok(Self {
            alerts,
            route_counts,
            total_alerts,
        })
    }

    pub fn from_alerts(alerts: Vec<Alert>) -> Self {
        Self {
            route_counts: count_routes(&alerts),
            total_alerts: alerts.len() as u64,
            alerts,
        }
    }
}

/// Alerts per route, in order of first appearance.
fn count_routes(alerts: &[Alert]) -> Vec<RouteCount> {
    let (order, counts) = alerts.iter().flat_map(|a| a.routes.iter()).fold(
        (Vec::<&str>::new(), HashMap::<&str, u64>::new()),
        |(mut order, mut counts), route| {
            let count = counts.entry(route.as_str()).or_insert_with(|| {
                order.push(route.as_str());
                0
            });
            *count += 1;
            (order, counts)
        },
    );

    order
        .into_iter()
        .map(|route| RouteCount {
            route: route.to_string(),
            count: counts[route],
        })
        .collect()
}

#[async_trait]
impl AlertStore for FileStore {
    async fn fetch_alerts(&self, window: TimeWindow) -> Result<Vec<Alert>> {
        Ok(self
            .alerts
            .iter()
            .filter(|a| window.contains(a.last_seen_time))
            .cloned()
            .collect())
    }

    async fn fetch_route_counts(&self) -> Result<Vec<RouteCount>> {
        Ok(self.route_counts.clone())
    }

    async fn total_alerts(&self) -> Result<u64> {
        Ok(self.total_alerts)
    }
}
