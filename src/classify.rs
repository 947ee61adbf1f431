//! Keyword-based cause classification.
//!
//! Every alert gets exactly one [`CauseCategory`]. Keywords are tested
//! case-insensitively in taxonomy order and the first hit wins, so
//! per-category counts always sum to the number of alerts classified.

use crate::alert::Alert;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fixed cause taxonomy, in priority and display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CauseCategory {
    #[serde(rename = "NYPD")]
    Nypd,
    #[serde(rename = "EMS")]
    Ems,
    #[serde(rename = "FDNY")]
    Fdny,
    Brakes,
    Door,
    Signal,
    Track,
    Cleaning,
    Switch,
    Disruptive,
    Mechanical,
    Other,
}

impl CauseCategory {
    pub const ALL: [CauseCategory; 12] = [
        CauseCategory::Nypd,
        CauseCategory::Ems,
        CauseCategory::Fdny,
        CauseCategory::Brakes,
        CauseCategory::Door,
        CauseCategory::Signal,
        CauseCategory::Track,
        CauseCategory::Cleaning,
        CauseCategory::Switch,
        CauseCategory::Disruptive,
        CauseCategory::Mechanical,
        CauseCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CauseCategory::Nypd => "NYPD",
            CauseCategory::Ems => "EMS",
            CauseCategory::Fdny => "FDNY",
            CauseCategory::Brakes => "Brakes",
            CauseCategory::Door => "Door",
            CauseCategory::Signal => "Signal",
            CauseCategory::Track => "Track",
            CauseCategory::Cleaning => "Cleaning",
            CauseCategory::Switch => "Switch",
            CauseCategory::Disruptive => "Disruptive",
            CauseCategory::Mechanical => "Mechanical",
            CauseCategory::Other => "Other",
        }
    }
}

impl fmt::Display for CauseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CauseCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        CauseCategory::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| anyhow::anyhow!("unknown cause category '{s}'"))
    }
}

/// How a keyword is tested against a lower-cased description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordMatch {
    /// Anywhere in the text, including inside longer words.
    Substring,
    /// As a whole alphanumeric token.
    Word,
}

/// One row of the taxonomy table.
#[derive(Debug, Clone, Copy)]
pub struct CauseKeyword {
    pub category: CauseCategory,
    pub keyword: &'static str,
    pub mode: KeywordMatch,
}

impl CauseKeyword {
    const fn substring(category: CauseCategory, keyword: &'static str) -> Self {
        Self {
            category,
            keyword,
            mode: KeywordMatch::Substring,
        }
    }

    const fn word(category: CauseCategory, keyword: &'static str) -> Self {
        Self {
            category,
            keyword,
            mode: KeywordMatch::Word,
        }
    }

    fn matches(&self, lower: &str) -> bool {
        match self.mode {
            KeywordMatch::Substring => lower.contains(self.keyword),
            KeywordMatch::Word => lower
                .split(|c: char| !c.is_alphanumeric())
                .any(|token| token == self.keyword),
        }
    }
}

/// Ordered taxonomy table. Keywords are lower-case.
///
/// Every keyword is a plain case-insensitive substring match, so "track"
/// matches any mention of a track and "brake" matches inside "unbrakeable".
/// The single exception is "ems", which must match a whole word: as a
/// substring it would match the "ems" inside "problems" and send
/// "brake problems" to EMS ahead of Brakes. Reordering or tightening these
/// rows changes every downstream count.
pub static CAUSE_KEYWORDS: &[CauseKeyword] = &[
    CauseKeyword::substring(CauseCategory::Nypd, "nypd"),
    CauseKeyword::word(CauseCategory::Ems, "ems"),
    CauseKeyword::substring(CauseCategory::Fdny, "fdny"),
    CauseKeyword::substring(CauseCategory::Brakes, "brake"),
    CauseKeyword::substring(CauseCategory::Door, "door"),
    CauseKeyword::substring(CauseCategory::Signal, "signal"),
    CauseKeyword::substring(CauseCategory::Track, "track"),
    CauseKeyword::substring(CauseCategory::Cleaning, "clean"),
    CauseKeyword::substring(CauseCategory::Switch, "switch"),
    CauseKeyword::substring(CauseCategory::Disruptive, "disruptive"),
    CauseKeyword::substring(CauseCategory::Mechanical, "mechanical"),
];

/// Returns the first category in `table` whose keyword matches `description`.
pub fn classify_with(table: &[CauseKeyword], description: &str) -> CauseCategory {
    let lower = description.to_lowercase();
    table
        .iter()
        .find(|row| row.matches(&lower))
        .map(|row| row.category)
        .unwrap_or(CauseCategory::Other)
}

/// Classifies a description against the fixed taxonomy.
pub fn classify(description: &str) -> CauseCategory {
    classify_with(CAUSE_KEYWORDS, description)
}

/// A category and how many alerts fell into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CauseCount {
    pub category: CauseCategory,
    pub count: usize,
}

/// Counts alerts per category, most frequent first.
///
/// Categories with no alerts are omitted. Ties keep taxonomy order.
pub fn cause_counts(alerts: &[Alert]) -> Vec<CauseCount> {
    let tally = alerts.iter().fold([0usize; 12], |mut acc, alert| {
        let category = classify(&alert.description);
        acc[category as usize] += 1;
        acc
    });

    let mut counts: Vec<CauseCount> = CauseCategory::ALL
        .iter()
        .zip(tally)
        .filter(|(_, count)| *count > 0)
        .map(|(category, count)| CauseCount {
            category: *category,
            count,
        })
        .collect();

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// The most frequent cause, or `None` when there are no alerts.
pub fn most_common_cause(alerts: &[Alert]) -> Option<CauseCategory> {
    cause_counts(alerts).first().map(|c| c.category)
}

/// Alerts classified as `category`; `None` keeps every alert.
pub fn filter_by_category(alerts: &[Alert], category: Option<CauseCategory>) -> Vec<Alert> {
    match category {
        None => alerts.to_vec(),
        Some(category) => alerts
            .iter()
            .filter(|a| classify(&a.description) == category)
            .cloned()
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::tests::alert;

    fn described(id: &str, description: &str) -> Alert {
        let mut a = alert(id, &["A"], "2025-05-01T12:00:00", "2025-05-01T12:00:00");
        a.description = description.to_string();
        a
    }

    #[test]
    fn test_classify_examples() {
        assert_eq!(
            classify("Train delayed due to brake problems"),
            CauseCategory::Brakes
        );
        assert_eq!(classify("Signal problem causing delays"), CauseCategory::Signal);
        assert_eq!(classify("Routine maintenance"), CauseCategory::Other);
        assert_eq!(classify(""), CauseCategory::Other);
    }

    #[test]
    fn test_classify_is_case_insensitive_substring() {
        assert_eq!(classify("NYPD investigating"), CauseCategory::Nypd);
        assert_eq!(classify("an UNBRAKEABLE train"), CauseCategory::Brakes);
        assert_eq!(classify("Cleaning crews on scene"), CauseCategory::Cleaning);
        assert_eq!(classify("a switch malfunction"), CauseCategory::Switch);
        assert_eq!(classify("trackside fire"), CauseCategory::Track);
    }

    #[test]
    fn test_ems_only_matches_whole_word() {
        assert_eq!(classify("brake problems"), CauseCategory::Brakes);
        assert_eq!(classify("Customer treated by EMS"), CauseCategory::Ems);
        assert_eq!(classify("EMS/NYPD on scene"), CauseCategory::Nypd);
        assert_eq!(classify("EMS/FDNY on scene"), CauseCategory::Ems);
        assert_eq!(classify("systems issue"), CauseCategory::Other);
    }

    #[test]
    fn test_first_category_in_order_wins() {
        assert_eq!(
            classify("signal problems near track work"),
            CauseCategory::Signal
        );
        assert_eq!(classify("track and signal work"), CauseCategory::Signal);
        assert_eq!(
            classify("FDNY responding to a door issue"),
            CauseCategory::Fdny
        );
    }

    #[test]
    fn test_classify_with_custom_table() {
        let table = [
            CauseKeyword::substring(CauseCategory::Track, "track"),
            CauseKeyword::substring(CauseCategory::Signal, "signal"),
        ];
        assert_eq!(
            classify_with(&table, "signal issue near the track"),
            CauseCategory::Track
        );
        assert_eq!(classify_with(&[], "signal"), CauseCategory::Other);
    }

    #[test]
    fn test_every_keyword_maps_to_its_category() {
        for row in CAUSE_KEYWORDS {
            assert_eq!(classify(row.keyword), row.category, "keyword {}", row.keyword);
        }
    }

    #[test]
    fn test_category_round_trips_through_str() {
        for category in CauseCategory::ALL {
            assert_eq!(category.as_str().parse::<CauseCategory>().unwrap(), category);
        }
        assert_eq!("nypd".parse::<CauseCategory>().unwrap(), CauseCategory::Nypd);
        assert!("weather".parse::<CauseCategory>().is_err());
    }

    #[test]
    fn test_cause_counts_sum_to_total_and_sort_descending() {
        let alerts = vec![
            described("1", "Signal issue"),
            described("2", "Door stuck"),
            described("3", "signal malfunction"),
            described("4", "Routine maintenance"),
            described("5", "Customer requires medical attention"),
        ];

        let counts = cause_counts(&alerts);
        let total: usize = counts.iter().map(|c| c.count).sum();
        assert_eq!(total, alerts.len());

        assert_eq!(counts.len(), 3);
        // ties keep taxonomy order
        assert_eq!(counts[0].category, CauseCategory::Signal);
        assert_eq!(counts[0].count, 2);
        assert_eq!(counts[1].category, CauseCategory::Other);
        assert_eq!(counts[1].count, 2);
        assert_eq!(counts[2].category, CauseCategory::Door);
        assert_eq!(counts[2].count, 1);
    }

    #[test]
    fn test_most_common_cause() {
        assert_eq!(most_common_cause(&[]), None);
        let alerts = vec![described("1", "door"), described("2", "Door again")];
        assert_eq!(most_common_cause(&alerts), Some(CauseCategory::Door));
    }

    #[test]
    fn test_filter_by_category_matches_counts() {
        let alerts = vec![
            described("1", "NYPD and a door problem"),
            described("2", "Door stuck"),
            described("3", "Routine maintenance"),
        ];

        assert_eq!(filter_by_category(&alerts, None).len(), 3);

        let doors = filter_by_category(&alerts, Some(CauseCategory::Door));
        assert_eq!(doors.len(), 1);
        assert_eq!(doors[0].id, "2");

        let other = filter_by_category(&alerts, Some(CauseCategory::Other));
        assert_eq!(other.len(), 1);
        assert_eq!(other[0].id, "3");
    }
}
