//! Collapses repeated observations of the same incident.
//!
//! The upstream feed re-emits an alert every time it is polled, so one
//! incident shows up as many rows. Alerts sharing a route set are treated as
//! one incident and only the most recently seen row is kept.

use crate::alert::Alert;
use std::collections::HashMap;
use tracing::debug;

/// Keeps one alert per incident signature: the one with the latest `last_seen_time`.
///
/// Ties keep the alert encountered first. The output order is unspecified.
pub fn dedupe(alerts: Vec<Alert>) -> Vec<Alert> {
    let input_len = alerts.len();

    let by_signature = alerts
        .into_iter()
        .fold(HashMap::<String, Alert>::new(), |mut acc, alert| {
            let signature = alert.signature();
            let newer = acc
                .get(&signature)
                .is_none_or(|existing| alert.last_seen_time > existing.last_seen_time);
            if newer {
                acc.insert(signature, alert);
            }
            acc
        });

    let survivors: Vec<Alert> = by_signature.into_values().collect();
    debug!(
        input = input_len,
        output = survivors.len(),
        "Deduplicated alerts by route set"
    );
    survivors
}
