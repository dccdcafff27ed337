use super::client::HttpClient;
use async_trait::async_trait;
use std::time::Duration;

use crate::config::Config;

pub struct BasicClient(reqwest::Client);

impl BasicClient {
    /// Client with the request and connect timeouts from `config`.
    pub fn from_config(config: &Config) -> reqwest::Result<Self> {
        Self::with_timeouts(config.timeout, config.connect_timeout)
    }

    pub fn with_timeouts(timeout: Duration, connect_timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()?;
        Ok(Self(client))
    }
}

#[async_trait]
impl HttpClient for BasicClient {
    fn post(&self, url: reqwest::Url) -> reqwest::RequestBuilder {
        self.0.post(url)
    }

    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        self.0.execute(req).await
    }
}
