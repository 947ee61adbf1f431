//! Time and route aggregation of alerts.
//!
//! This module buckets alerts by civil day and hour of day, ranks routes,
//! splits alerts into active and past, assembles the results into
//! serializable reports, and publishes them as JSON locally or to S3.

pub mod aggregate;
pub mod analyzer;
pub mod daily;
pub mod hourly;
pub mod partition;
pub mod ranking;
pub mod types;
pub mod utility;
pub mod writetos3;
