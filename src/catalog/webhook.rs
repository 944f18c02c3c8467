//! HTTP crawler trigger
//!
//! For catalogs that expose crawler control over plain HTTP:
//! `POST {endpoint}/crawlers/{name}/start`.

use super::CatalogTrigger;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Starts crawlers by posting to an HTTP endpoint
#[derive(Debug, Clone)]
pub struct WebhookCrawler {
    client: Client,
    endpoint: Url,
}

impl WebhookCrawler {
    /// Create a trigger for the given base URL
    pub fn new(endpoint: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| Error::config(format!("Invalid catalog endpoint {endpoint}: {e}")))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, endpoint })
    }

    /// URL that starts the named crawler
    pub fn start_url(&self, name: &str) -> Result<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| Error::config(format!("Endpoint cannot be a base: {}", self.endpoint)))?
            .pop_if_empty()
            .extend(["crawlers", name, "start"]);
        Ok(url)
    }
}

#[async_trait]
impl CatalogTrigger for WebhookCrawler {
    async fn start_crawler(&self, name: &str) -> Result<()> {
        let url = self.start_url(name)?;
        debug!("Starting crawler via POST {}", url);

        let response = self
            .client
            .post(url)
            .send()
            .await
            .map_err(|e| Error::crawler(name, e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        if status == StatusCode::CONFLICT {
            return Err(Error::CrawlerAlreadyRunning {
                crawler: name.to_string(),
            });
        }

        let body = response.text().await.unwrap_or_default();
        Err(Error::crawler(name, format!("HTTP {}: {body}", status.as_u16())))
    }

    fn kind(&self) -> &'static str {
        "webhook"
    }
}
