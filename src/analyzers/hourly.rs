use crate::alert::Alert;
use crate::analyzers::types::{HourBucket, HourlyDistribution};
use crate::analyzers::utility::{civil_date, is_weekend, per_day, utc_hour};
use chrono::NaiveDate;
use chrono_tz::Tz;
use std::collections::BTreeSet;

/// Per-hour tally: alert count and the distinct days the hour was seen on.
#[derive(Debug, Clone, Default)]
struct HourTally {
    count: usize,
    days: BTreeSet<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
struct HourTallies([HourTally; 24]);

impl HourTallies {
    fn with(mut self, hour: u32, date: NaiveDate) -> Self {
        let tally = &mut self.0[hour as usize];
        tally.count += 1;
        tally.days.insert(date);
        self
    }

    fn into_buckets(self) -> Vec<HourBucket> {
        self.0
            .into_iter()
            .zip(0u32..)
            .map(|(tally, hour)| HourBucket {
                hour,
                count: tally.count,
                days_observed: tally.days.len(),
                average: per_day(tally.count, tally.days.len()),
            })
            .collect()
    }
}

/// Average alerts per observed day for each UTC hour of `start_time`.
///
/// The denominator is the number of distinct civil dates (in `tz`) on which
/// that hour had at least one alert, so sparse hours are not diluted by days where they never
/// appear. Always returns 24 buckets.
pub fn hour_of_day(alerts: &[Alert], tz: Tz) -> Vec<HourBucket> {
    alerts
        .iter()
        .fold(HourTallies::default(), |acc, alert| {
            acc.with(
                utc_hour(alert.start_time),
                civil_date(alert.start_time, tz),
            )
        })
        .into_buckets()
}

/// [`hour_of_day`] over all alerts plus independent weekday and weekend series.
///
/// Weekday or weekend is decided by the civil date in `tz`, not the UTC date.
pub fn hourly_distribution(alerts: &[Alert], tz: Tz) -> HourlyDistribution {
    let (weekday, weekend) = alerts.iter().fold(
        (HourTallies::default(), HourTallies::default()),
        |(weekday, weekend), alert| {
            let hour = utc_hour(alert.start_time);
            let date = civil_date(alert.start_time, tz);
            if is_weekend(date) {
                (weekday, weekend.with(hour, date))
            } else {
                (weekday.with(hour, date), weekend)
            }
        },
    );

    HourlyDistribution {
        all: hour_of_day(alerts, tz),
        weekday: weekday.into_buckets(),
        weekend: weekend.into_buckets(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::tests::alert;
    use chrono_tz::America::New_York;

    fn started_at(start: &str) -> Alert {
        alert(start, &["A"], start, start)
    }

    #[test]
    fn test_empty_gives_24_zero_buckets() {
        let buckets = hour_of_day(&[], New_York);
        assert_eq!(buckets.len(), 24);
        assert!(buckets.iter().all(|b| b.count == 0 && b.average == 0.0));
        assert_eq!(buckets[23].hour, 23);
    }

    #[test]
    fn test_average_uses_distinct_days_for_that_hour() {
        // 12:00 UTC: two alerts on May 1, one on May 2
        // 22:00 UTC: one alert on May 1 only
        let alerts = vec![
            started_at("2025-05-01T12:05:00"),
            started_at("2025-05-01T12:45:00"),
            started_at("2025-05-02T12:10:00"),
            started_at("2025-05-01T22:30:00"),
        ];

        let buckets = hour_of_day(&alerts, New_York);
        assert_eq!(buckets[12].count, 3);
        assert_eq!(buckets[12].days_observed, 2);
        assert_eq!(buckets[12].average, 1.5);

        assert_eq!(buckets[22].count, 1);
        assert_eq!(buckets[22].days_observed, 1);
        assert_eq!(buckets[22].average, 1.0);

        assert_eq!(buckets[8].count, 0);
        assert_eq!(buckets[3].average, 0.0);
    }

    #[test]
    fn test_weekday_weekend_split_has_independent_denominators() {
        // Thu May 1 and Fri May 2 are weekdays, Sat May 3 is a weekend day
        let alerts = vec![
            started_at("2025-05-01T12:00:00"),
            started_at("2025-05-02T12:00:00"),
            started_at("2025-05-03T12:00:00"),
            started_at("2025-05-03T12:30:00"),
        ];

        let dist = hourly_distribution(&alerts, New_York);

        assert_eq!(dist.weekday[12].count, 2);
        assert_eq!(dist.weekday[12].days_observed, 2);
        assert_eq!(dist.weekday[12].average, 1.0);

        assert_eq!(dist.weekend[12].count, 2);
        assert_eq!(dist.weekend[12].days_observed, 1);
        assert_eq!(dist.weekend[12].average, 2.0);

        assert_eq!(dist.all[12].count, 4);
        assert_eq!(dist.all[12].days_observed, 3);
    }

    #[test]
    fn test_weekend_hour_never_observed_is_zero() {
        let alerts = vec![started_at("2025-05-01T12:00:00")];
        let dist = hourly_distribution(&alerts, New_York);

        assert_eq!(dist.weekend.len(), 24);
        assert_eq!(dist.weekend[12].days_observed, 0);
        assert_eq!(dist.weekend[12].average, 0.0);
        assert!(dist.weekend[12].average.is_finite());
    }

    #[test]
    fn test_utc_hour_with_civil_day_near_midnight() {
        // Sat 01:00 UTC is still Friday May 2 in New York
        let alerts = vec![
            started_at("2025-05-03T01:00:00"),
            started_at("2025-05-02T01:30:00"),
        ];
        let dist = hourly_distribution(&alerts, New_York);

        assert_eq!(dist.weekday[1].count, 2);
        // Thu May 1 and Fri May 2 in New York
        assert_eq!(dist.weekday[1].days_observed, 2);
        assert_eq!(dist.weekday[1].average, 1.0);
        assert!(dist.weekend.iter().all(|b| b.count == 0));
        assert_eq!(dist.weekday[21].count, 0);
        assert_eq!(dist.all[1].days_observed, 2);
    }

    #[test]
    fn test_same_utc_hour_on_one_civil_day() {
        // Both fall on Friday May 2 in New York
        let alerts = vec![
            started_at("2025-05-03T01:10:00"),
            started_at("2025-05-03T01:50:00"),
        ];
        let buckets = hour_of_day(&alerts, New_York);

        assert_eq!(buckets[1].count, 2);
        assert_eq!(buckets[1].days_observed, 1);
        assert_eq!(buckets[1].average, 2.0);
    }
}
