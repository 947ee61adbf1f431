use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use tracing::{debug, info};

use crate::alert::Alert;
use crate::analyzers::types::RouteCount;
use crate::fetch::auth::ApiKey;
use crate::fetch::{BasicClient, HttpClient, get, get_json, paginate};
use crate::services::alert_store::{AlertStore, TimeWindow, decode_rows};

const ALERT_COLUMNS: &str = "alert_id,routes,start_time,last_seen_time,description";

/// Reads alerts from the Supabase REST (PostgREST) endpoint.
///
/// `alerts` holds one row per observed alert with naive UTC timestamps;
/// `route_counts` is a view of per-route totals.
pub struct SupabaseClient<C> {
    base_url: String,
    client: C,
    page_size: usize,
}

impl SupabaseClient<ApiKey<ApiKey<BasicClient>>> {
    /// Client authenticated with the project's API key.
    pub fn new(base_url: &str, api_key: &str, page_size: usize) -> Result<Self> {
        let client = ApiKey::supabase(BasicClient::new()?, api_key)?;
        Ok(Self::with_client(base_url, client, page_size))
    }
}

impl<C: HttpClient> SupabaseClient<C> {
    pub fn with_client(base_url: &str, client: C, page_size: usize) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            page_size,
        }
    }

    fn table_url(&self, table: &str, params: &[(&str, String)]) -> Result<Url> {
        let url = format!("{}/rest/v1/{}", self.base_url, table);
        Url::parse_with_params(&url, params).with_context(|| format!("invalid store URL '{url}'"))
    }

    async fn fetch_alert_page(
        &self,
        window: TimeWindow,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Value>> {
        let url = self.table_url("alerts", &alert_query(window, offset, limit))?;
        get_json(&self.client, url).await
    }
}

/// Query parameters for one page of alerts in `window`, newest first.
fn alert_query(window: TimeWindow, offset: usize, limit: usize) -> Vec<(&'static str, String)> {
    vec![
        ("select", ALERT_COLUMNS.to_string()),
        ("last_seen_time", format!("gte.{}", store_timestamp(window.since))),
        ("last_seen_time", format!("lte.{}", store_timestamp(window.until))),
        ("order", "last_seen_time.desc,alert_id.asc".to_string()),
        ("offset", offset.to_string()),
        ("limit", limit.to_string()),
    ]
}

/// The store compares against naive UTC values.
fn store_timestamp(instant: chrono::DateTime<chrono::Utc>) -> String {
    instant.naive_utc().format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Total row count from a `Content-Range` header such as `0-0/1234` or `*/0`.
fn parse_content_range_total(header: &str) -> Option<u64> {
    header.rsplit_once('/')?.1.trim().parse().ok()
}

#[async_trait]
impl<C: HttpClient> AlertStore for SupabaseClient<C> {
    async fn fetch_alerts(&self, window: TimeWindow) -> Result<Vec<Alert>> {
        let rows = paginate(self.page_size, |offset, limit| {
            self.fetch_alert_page(window, offset, limit)
        })
        .await?;

        let raw = rows.len();
        let alerts = decode_rows(rows);
        info!(rows = raw, alerts = alerts.len(), "Fetched alerts from store");
        Ok(alerts)
    }

    async fn fetch_route_counts(&self) -> Result<Vec<RouteCount>> {
        let url = self.table_url(
            "route_counts",
            &[
                ("select", "route,count".to_string()),
                ("order", "count.desc".to_string()),
            ],
        )?;
        let counts: Vec<RouteCount> = get_json(&self.client, url).await?;
        debug!(routes = counts.len(), "Fetched route counts");
        Ok(counts)
    }

    async fn total_alerts(&self) -> Result<u64> {
        let url = self.table_url(
            "alerts",
            &[("select", "alert_id".to_string()), ("limit", "1".to_string())],
        )?;
        let resp = get(&self.client, url, &[("Prefer", "count=exact")]).await?;

        let header = resp
            .headers()
            .get(reqwest::header::CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .context("store response had no Content-Range header")?;
        parse_content_range_total(header)
            .with_context(|| format!("unparseable Content-Range '{header}'"))
    }
}
