use async_trait::async_trait;
use reqwest::{Request, Response};

/// Executes prepared requests. Auth wrappers implement this by decorating an
/// inner client, and tests can swap in a canned transport.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
