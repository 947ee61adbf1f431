//! HTTP plumbing for the alert store: a pluggable client, auth wrappers and
//! page-by-page retrieval.

mod basic;
mod client;
pub mod auth;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Result, bail};
use reqwest::header::HeaderValue;
use reqwest::{Method, Request, Response, Url};
use serde::de::DeserializeOwned;
use std::future::Future;
use tracing::debug;

/// Sends a GET through `client`, failing on any non-success status.
pub async fn get<C: HttpClient>(
    client: &C,
    url: Url,
    headers: &[(&'static str, &str)],
) -> Result<Response> {
    let mut req = Request::new(Method::GET, url);
    for (name, value) in headers {
        req.headers_mut()
            .insert(*name, value.parse::<HeaderValue>()?);
    }

    let resp = client.execute(req).await?;
    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        bail!("request returned status {}: {}", status, body);
    }
    Ok(resp)
}

/// GETs `url` and decodes the JSON body as `T`.
pub async fn get_json<C: HttpClient, T: DeserializeOwned>(client: &C, url: Url) -> Result<T> {
    Ok(get(client, url, &[]).await?.json().await?)
}

/// Requests pages of `page_size` rows until a page comes back short.
///
/// `fetch_page` receives `(offset, limit)`. Rows from every page are returned
/// in order as one collection.
pub async fn paginate<T, F, Fut>(page_size: usize, mut fetch_page: F) -> Result<Vec<T>>
where
    F: FnMut(usize, usize) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    if page_size == 0 {
        bail!("page size must be positive");
    }

    let mut rows = Vec::new();
    let mut offset = 0;

    loop {
        let page = fetch_page(offset, page_size).await?;
        let len = page.len();
        debug!(offset, len, "Fetched page");
        rows.extend(page);

        if len < page_size {
            break;
        }
        offset += len;
    }

    Ok(rows)
}
