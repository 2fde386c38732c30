use std::time::Duration;

use async_trait::async_trait;
use ca_core::{Error, Result};
use reqwest::Client;
use tracing::debug;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Retrieves raw markup for a page. `slug` only labels errors.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, slug: &str, url: &str) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, slug: &str, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::fetch(slug, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::fetch(slug, format!("HTTP {}", status)));
        }

        let body = response.text().await.map_err(|e| Error::fetch(slug, e))?;
        debug!(slug, url, bytes = body.len(), "fetched page");
        Ok(body)
    }
}
