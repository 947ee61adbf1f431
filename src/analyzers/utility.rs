use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc, Weekday};
use chrono_tz::Tz;

/// Divides `count` by `days`, returning 0.0 when `days` is zero.
pub fn per_day(count: usize, days: usize) -> f64 {
    if days == 0 {
        return 0.0;
    }
    count as f64 / days as f64
}

/// Calendar date of `instant` in the civil timezone `tz`.
pub fn civil_date(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// Hour of day (0-23) of `instant` in UTC.
pub fn utc_hour(instant: DateTime<Utc>) -> u32 {
    instant.hour()
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Every date from `first` to `last` inclusive. Empty if `last < first`.
pub fn date_range(first: NaiveDate, last: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    first.iter_days().take_while(move |d| *d <= last)
}

/// Short chart label, e.g. `Thu, 5/1`.
pub fn day_label(date: NaiveDate) -> String {
    date.format("%a, %-m/%-d").to_string()
}

/// Section heading, e.g. `Thu, May 1`.
pub fn day_heading(date: NaiveDate) -> String {
    date.format("%a, %B %-d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::New_York;

    #[test]
    fn test_per_day_zero_days() {
        assert_eq!(per_day(5, 0), 0.0);
        assert_eq!(per_day(0, 0), 0.0);
    }

    #[test]
    fn test_per_day_normal_values() {
        assert_eq!(per_day(6, 3), 2.0);
        assert_eq!(per_day(1, 4), 0.25);
    }

    #[test]
    fn test_civil_date_crosses_midnight() {
        // 02:30 UTC is still the previous evening in New York
        let instant = Utc.with_ymd_and_hms(2025, 5, 2, 2, 30, 0).unwrap();
        assert_eq!(
            civil_date(instant, New_York),
            NaiveDate::from_ymd_opt(2025, 5, 1).unwrap()
        );
        assert_eq!(civil_date(instant, Tz::UTC), NaiveDate::from_ymd_opt(2025, 5, 2).unwrap());
        assert_eq!(utc_hour(instant), 2);
    }

    #[test]
    fn test_utc_hour_ignores_dst() {
        let winter = Utc.with_ymd_and_hms(2025, 1, 15, 17, 0, 0).unwrap();
        let summer = Utc.with_ymd_and_hms(2025, 7, 15, 17, 0, 0).unwrap();
        assert_eq!(utc_hour(winter), 17);
        assert_eq!(utc_hour(summer), 17);
    }

    #[test]
    fn test_is_weekend() {
        let saturday = NaiveDate::from_ymd_opt(2025, 5, 3).unwrap();
        let sunday = NaiveDate::from_ymd_opt(2025, 5, 4).unwrap();
        let monday = NaiveDate::from_ymd_opt(2025, 5, 5).unwrap();
        assert!(is_weekend(saturday));
        assert!(is_weekend(sunday));
        assert!(!is_weekend(monday));
    }

    #[test]
    fn test_date_range_inclusive() {
        let first = NaiveDate::from_ymd_opt(2025, 2, 27).unwrap();
        let last = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
        let days: Vec<_> = date_range(first, last).collect();
        assert_eq!(days.len(), 4);
        assert_eq!(days[0], first);
        assert_eq!(days[3], last);

        assert_eq!(date_range(last, first).count(), 0);
        assert_eq!(date_range(first, first).count(), 1);
    }

    #[test]
    fn test_labels() {
        let date = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        assert_eq!(day_label(date), "Thu, 5/1");
        assert_eq!(day_heading(date), "Thu, May 1");
    }
}
