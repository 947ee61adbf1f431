//! The alert record and the helpers shared by every stage of the pipeline.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A single reported service disruption as materialized from the alert store.
///
/// Timestamps are always UTC instants. The store keeps them as naive values,
/// so decoding annotates them as UTC explicitly instead of trusting the host
/// timezone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(alias = "alert_id")]
    pub id: String,
    pub routes: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(deserialize_with = "deserialize_utc")]
    pub start_time: DateTime<Utc>,
    #[serde(deserialize_with = "deserialize_utc")]
    pub last_seen_time: DateTime<Utc>,
}

impl Alert {
    /// Sorted, comma-joined route set identifying the incident this alert belongs to.
    pub fn signature(&self) -> String {
        let mut routes: Vec<&str> = self.routes.iter().map(String::as_str).collect();
        routes.sort_unstable();
        routes.join(",")
    }

    /// Route codes mentioned in bracket notation inside the description.
    pub fn description_routes(&self) -> Vec<&str> {
        route_tokens(&self.description)
    }
}

/// Parses a stored timestamp into a UTC instant.
///
/// Accepts naive `YYYY-MM-DDTHH:MM:SS[.fff]` values (with `T` or a space as
/// separator), which are taken to be UTC, and RFC 3339 values carrying an
/// explicit offset, which are converted to UTC.
pub fn parse_utc(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        bail!("empty timestamp");
    }

    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Ok(with_offset.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }

    DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%#z")
        .map(|t| t.with_timezone(&Utc))
        .with_context(|| format!("unrecognised timestamp '{raw}'"))
}

fn deserialize_utc<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_utc(&raw).map_err(serde::de::Error::custom)
}

/// Extracts `[A]`, `[7]`, `[SIR]`-style route tokens from free text, in order.
///
/// Only uppercase ASCII letters and digits are accepted between the brackets.
pub fn route_tokens(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find('[') {
        let after = &rest[open + 1..];
        let Some(close) = after.find(']') else {
            break;
        };
        let candidate = &after[..close];
        let valid = !candidate.is_empty()
            && candidate
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit());

        if valid {
            tokens.push(candidate);
            rest = &after[close + 1..];
        } else {
            // a nested '[' may still open a valid token
            rest = after;
        }
    }

    tokens
}
