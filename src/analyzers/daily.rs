use crate::alert::Alert;
use crate::analyzers::types::DayCount;
use crate::analyzers::utility::{civil_date, date_range, day_label};
use chrono::NaiveDate;
use chrono_tz::Tz;
use std::collections::BTreeMap;

/// Counts alerts per civil day of `last_seen_time`, filling every day between
/// the first and last observed day with zeros.
///
/// `trailing_days` keeps only the most recent N calendar days of the filled
/// series; `Some(0)` keeps all of it, like `None`. Returns `None` when there
/// are no alerts.
pub fn daily_counts(alerts: &[Alert], tz: Tz, trailing_days: Option<usize>) -> Option<Vec<DayCount>> {
    let per_day = alerts
        .iter()
        .fold(BTreeMap::<NaiveDate, usize>::new(), |mut acc, alert| {
            *acc.entry(civil_date(alert.last_seen_time, tz)).or_default() += 1;
            acc
        });

    let first = *per_day.keys().next()?;
    let last = *per_day.keys().next_back()?;

    let mut series: Vec<DayCount> = date_range(first, last)
        .map(|date| DayCount {
            date,
            label: day_label(date),
            count: per_day.get(&date).copied().unwrap_or(0),
        })
        .collect();

    if let Some(days) = trailing_days.filter(|&days| days > 0) {
        let skip = series.len().saturating_sub(days);
        series.drain(..skip);
    }

    Some(series)
}
