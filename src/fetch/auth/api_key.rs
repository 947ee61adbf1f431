use crate::fetch::client::HttpClient;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue};

/// An [`HttpClient`] wrapper that injects an API key as an HTTP header.
///
/// Wrappers nest, so a store that wants both an `apikey` header and an
/// `Authorization` bearer token wraps twice (see [`ApiKey::supabase`]).
pub struct ApiKey<C> {
    inner: C,
    header_name: HeaderName,
    value: HeaderValue,
}

impl<C> ApiKey<C> {
    /// Validates the header up front so requests never carry a bad one.
    pub fn new(inner: C, header_name: &str, value: &str) -> Result<Self> {
        let header_name = HeaderName::from_bytes(header_name.as_bytes())?;
        let mut value = HeaderValue::from_str(value)?;
        value.set_sensitive(true);
        Ok(Self {
            inner,
            header_name,
            value,
        })
    }

    /// `Authorization: Bearer <key>`.
    pub fn bearer(inner: C, key: &str) -> Result<Self> {
        Self::new(inner, "Authorization", &format!("Bearer {key}"))
    }

    /// Both headers PostgREST behind Supabase expects: `apikey` and a bearer token.
    pub fn supabase(inner: C, key: &str) -> Result<ApiKey<ApiKey<C>>> {
        ApiKey::new(Self::bearer(inner, key)?, "apikey", key)
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for ApiKey<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        req.headers_mut()
            .insert(self.header_name.clone(), self.value.clone());
        self.inner.execute(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::BasicClient;

    #[test]
    fn test_rejects_invalid_header() {
        assert!(ApiKey::new(BasicClient::new().unwrap(), "bad header", "x").is_err());
        assert!(ApiKey::new(BasicClient::new().unwrap(), "apikey", "line\nbreak").is_err());
    }

    #[test]
    fn test_supabase_wraps_both_headers() {
        let client = ApiKey::supabase(BasicClient::new().unwrap(), "secret").unwrap();
        assert_eq!(client.header_name.as_str(), "apikey");
        assert_eq!(client.inner.header_name.as_str(), "authorization");
        assert_eq!(client.inner.value.to_str().unwrap(), "Bearer secret");
    }
}
