use crate::alert::Alert;
use crate::analyzers::aggregate::{causes_report, incidents_report, metrics_report};
use crate::analyzers::types::{CausesReport, IncidentsReport, MetricsReport};
use crate::analyzers::writetos3::{encode_json, write_json_to_s3};
use crate::classify::CauseCategory;
use crate::config::ReportConfig;
use crate::dedupe::dedupe;
use crate::services::alert_store::{
    AlertStore, TimeWindow, fetch_alerts_or_empty, fetch_route_counts_or_empty,
    total_alerts_or_zero,
};
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::cmp::Reverse;
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;

/// Where a finished report is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Stdout,
    File(PathBuf),
    S3 { bucket: String, key: String },
}

impl FromStr for Destination {
    type Err = anyhow::Error;

    /// `-` for stdout, `s3://bucket/key` for S3, anything else is a local path.
    fn from_str(s: &str) -> Result<Self> {
        if s == "-" {
            return Ok(Destination::Stdout);
        }
        if let Some(rest) = s.strip_prefix("s3://") {
            let (bucket, key) = rest
                .split_once('/')
                .filter(|(bucket, key)| !bucket.is_empty() && !key.is_empty())
                .with_context(|| format!("S3 destination '{s}' needs a bucket and a key"))?;
            return Ok(Destination::S3 {
                bucket: bucket.to_string(),
                key: key.to_string(),
            });
        }
        Ok(Destination::File(PathBuf::from(s)))
    }
}

/// Fetches the alerts last seen in `window`, optionally collapsing repeats.
///
/// A failed fetch yields an empty collection.
pub async fn load_alerts(store: &dyn AlertStore, window: TimeWindow, collapse: bool) -> Vec<Alert> {
    let alerts = fetch_alerts_or_empty(store, window).await;
    if collapse { dedupe(alerts) } else { alerts }
}

/// Builds the overview over the last `lookback_days` days.
#[tracing::instrument(skip(store, config))]
pub async fn analyze_metrics(
    store: &dyn AlertStore,
    config: &ReportConfig,
    lookback_days: i64,
    collapse: bool,
    now: DateTime<Utc>,
) -> MetricsReport {
    let window = TimeWindow::trailing_days(now, lookback_days);
    let (alerts, route_counts, total) = tokio::join!(
        load_alerts(store, window, collapse),
        fetch_route_counts_or_empty(store),
        total_alerts_or_zero(store),
    );

    info!(alerts = alerts.len(), routes = route_counts.len(), total, "Building metrics report");
    metrics_report(&alerts, route_counts, total, lookback_days, config, now)
}

/// Builds the cause breakdown over the last `lookback_days` days.
#[tracing::instrument(skip(store))]
pub async fn analyze_causes(
    store: &dyn AlertStore,
    category: Option<CauseCategory>,
    lookback_days: i64,
    collapse: bool,
    now: DateTime<Utc>,
) -> CausesReport {
    let window = TimeWindow::trailing_days(now, lookback_days);
    let alerts = load_alerts(store, window, collapse).await;

    info!(alerts = alerts.len(), "Building causes report");
    causes_report(&alerts, category, lookback_days, now)
}

/// Builds the active/past incident listing over the last `lookback_days` days.
#[tracing::instrument(skip(store, config))]
pub async fn analyze_incidents(
    store: &dyn AlertStore,
    config: &ReportConfig,
    lookback_days: i64,
    trim_oldest_day: bool,
    collapse: bool,
    now: DateTime<Utc>,
) -> IncidentsReport {
    let window = TimeWindow::trailing_days(now, lookback_days);
    let alerts = load_alerts(store, window, collapse).await;

    info!(alerts = alerts.len(), "Building incidents report");
    incidents_report(alerts, lookback_days, trim_oldest_day, config, now)
}

/// Alerts seen in the last `minutes` minutes, one per incident, newest first.
#[tracing::instrument(skip(store))]
pub async fn live_alerts(store: &dyn AlertStore, minutes: i64, now: DateTime<Utc>) -> Vec<Alert> {
    let window = TimeWindow::trailing(now, Duration::minutes(minutes));
    let mut alerts = load_alerts(store, window, true).await;
    alerts.sort_by_key(|a| Reverse(a.last_seen_time));
    alerts
}

/// Writes `value` as JSON to `destination`.
pub async fn publish(value: &impl Serialize, destination: &Destination, gzip: bool) -> Result<()> {
    match destination {
        Destination::Stdout => {
            let mut stdout = std::io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, value)?;
            writeln!(stdout)?;
        }
        Destination::File(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, encode_json(value, gzip)?)
                .with_context(|| format!("failed to write '{}'", path.display()))?;
            info!(path = %path.display(), gzip, "Wrote report");
        }
        Destination::S3 { bucket, key } => {
            let config = aws_config::load_from_env().await;
            let s3 = aws_sdk_s3::Client::new(&config);
            write_json_to_s3(&s3, bucket, key, value, gzip).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::parse_utc;
    use crate::alert::tests::alert;
    use crate::infra::FileStore;

    fn store() -> FileStore {
        FileStore::from_alerts(vec![
            alert("1", &["A", "C"], "2025-05-03T15:00:00", "2025-05-03T15:40:00"),
            alert("2", &["C", "A"], "2025-05-03T15:00:00", "2025-05-03T15:55:00"),
            alert("3", &["7"], "2025-05-03T15:30:00", "2025-05-03T15:50:00"),
            alert("4", &["L"], "2025-05-01T10:00:00", "2025-05-01T11:00:00"),
        ])
    }

    fn now() -> DateTime<Utc> {
        parse_utc("2025-05-03T16:00:00").unwrap()
    }

    #[test]
    fn test_destination_parsing() {
        assert_eq!("-".parse::<Destination>().unwrap(), Destination::Stdout);
        assert_eq!(
            "s3://bucket/reports/metrics.json".parse::<Destination>().unwrap(),
            Destination::S3 {
                bucket: "bucket".to_string(),
                key: "reports/metrics.json".to_string(),
            }
        );
        assert_eq!(
            "out/metrics.json".parse::<Destination>().unwrap(),
            Destination::File(PathBuf::from("out/metrics.json"))
        );
        assert!("s3://bucket".parse::<Destination>().is_err());
        assert!("s3:///key".parse::<Destination>().is_err());
    }

    #[tokio::test]
    async fn test_live_alerts_collapse_repeats() {
        let live = live_alerts(&store(), 15, now()).await;
        let ids: Vec<&str> = live.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3"]);
    }

    #[tokio::test]
    async fn test_load_alerts_without_collapse_keeps_rows() {
        let window = TimeWindow::trailing_days(now(), 7);
        assert_eq!(load_alerts(&store(), window, false).await.len(), 4);
        assert_eq!(load_alerts(&store(), window, true).await.len(), 3);
    }

    #[tokio::test]
    async fn test_analyze_metrics_from_store() {
        let report = analyze_metrics(&store(), &ReportConfig::default(), 32, false, now()).await;
        assert_eq!(report.total_alerts, 4);
        assert_eq!(report.most_delayed_route.as_deref(), Some("A"));
        assert_eq!(report.daily.map(|d| d.len()), Some(3));
    }

    #[tokio::test]
    async fn test_publish_to_file() {
        let path = std::env::temp_dir().join("subway_delays_publish_test.json");
        let _ = std::fs::remove_file(&path);

        let report = analyze_causes(&store(), None, 7, false, now()).await;
        publish(&report, &Destination::File(path.clone()), false)
            .await
            .unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["incidents"].as_array().unwrap().len(), 4);
        assert_eq!(written["schema_version"], 1);

        std::fs::remove_file(&path).unwrap();
    }
}
