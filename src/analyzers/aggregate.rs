use crate::alert::Alert;
use crate::analyzers::daily::daily_counts;
use crate::analyzers::hourly::hourly_distribution;
use crate::analyzers::partition::partition_by_recency;
use crate::analyzers::ranking::{most_delayed_route, rank_routes};
use crate::analyzers::types::{CausesReport, IncidentsReport, MetricsReport, RouteCount};
use crate::classify::{CauseCategory, cause_counts, filter_by_category, most_common_cause};
use crate::config::ReportConfig;
use chrono::{DateTime, Utc};

const SCHEMA_VERSION: u8 = 1;

/// Overview built from one lookback window of alerts and the store's route
/// aggregates.
pub fn metrics_report(
    alerts: &[Alert],
    route_counts: Vec<RouteCount>,
    total_alerts: u64,
    lookback_days: i64,
    config: &ReportConfig,
    now: DateTime<Utc>,
) -> MetricsReport {
    let route_ranking = rank_routes(route_counts, config.top_routes);

    MetricsReport {
        schema_version: SCHEMA_VERSION,
        generated_at: now,
        lookback_days,
        total_alerts,
        most_delayed_route: most_delayed_route(&route_ranking).map(str::to_string),
        most_common_cause: most_common_cause(alerts),
        route_ranking,
        daily: daily_counts(alerts, config.timezone, config.trailing_days),
        hourly: hourly_distribution(alerts, config.timezone),
    }
}

/// Cause breakdown over `alerts`, listing the incidents in `category`.
pub fn causes_report(
    alerts: &[Alert],
    category: Option<CauseCategory>,
    lookback_days: i64,
    now: DateTime<Utc>,
) -> CausesReport {
    let mut incidents = filter_by_category(alerts, category);
    incidents.sort_by(|a, b| b.last_seen_time.cmp(&a.last_seen_time));

    CausesReport {
        schema_version: SCHEMA_VERSION,
        generated_at: now,
        lookback_days,
        category,
        causes: cause_counts(alerts),
        incidents,
    }
}

/// Active delays and past incidents as of `now`.
///
/// With `trim_oldest_day`, the oldest past day is dropped since a fixed
/// lookback only covers part of it.
pub fn incidents_report(
    alerts: Vec<Alert>,
    lookback_days: i64,
    trim_oldest_day: bool,
    config: &ReportConfig,
    now: DateTime<Utc>,
) -> IncidentsReport {
    let partition =
        partition_by_recency(alerts, now, config.recency_threshold(), config.timezone);
    let partition = if trim_oldest_day {
        partition.without_oldest_day()
    } else {
        partition
    };

    IncidentsReport {
        schema_version: SCHEMA_VERSION,
        generated_at: now,
        lookback_days,
        partition,
    }
}
