use crate::alert::Alert;
use crate::analyzers::types::{DayGroup, Partition};
use crate::analyzers::utility::{civil_date, day_heading};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// Splits alerts into active (seen strictly within `threshold` of `now`) and
/// past, grouping past alerts by civil day of `last_seen_time`.
///
/// Every input alert lands in exactly one side.
pub fn partition_by_recency(
    alerts: Vec<Alert>,
    now: DateTime<Utc>,
    threshold: Duration,
    tz: Tz,
) -> Partition {
    let cutoff = now - threshold;

    let (mut active, past): (Vec<Alert>, Vec<Alert>) = alerts
        .into_iter()
        .partition(|alert| alert.last_seen_time > cutoff);

    active.sort_by_key(|alert| Reverse(alert.last_seen_time));

    let by_day = past
        .into_iter()
        .fold(BTreeMap::<NaiveDate, Vec<Alert>>::new(), |mut acc, alert| {
            acc.entry(civil_date(alert.last_seen_time, tz))
                .or_default()
                .push(alert);
            acc
        });

    let past = by_day
        .into_iter()
        .rev()
        .map(|(date, mut alerts)| {
            alerts.sort_by_key(|alert| Reverse(alert.last_seen_time));
            DayGroup {
                date,
                label: day_heading(date),
                alerts,
            }
        })
        .collect();

    Partition { active, past }
}

impl Partition {
    /// Drops the oldest past day, which a fixed lookback usually cuts short.
    pub fn without_oldest_day(mut self) -> Self {
        self.past.pop();
        self
    }

    pub fn past_len(&self) -> usize {
        self.past.iter().map(|group| group.alerts.len()).sum()
    }
}
