use async_trait::async_trait;
use reqwest::{Request, RequestBuilder, Response, Url};

/// Executes HTTP requests. Swappable so callers can be tested without a
/// network.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Starts a POST to `url` on the underlying client.
    fn post(&self, url: Url) -> RequestBuilder;

    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
