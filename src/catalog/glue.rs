//! AWS Glue crawler trigger

use super::CatalogTrigger;
use crate::error::{Error, Result};
use async_trait::async_trait;
use aws_sdk_glue::Client as GlueClient;

/// Starts crawlers through the Glue `StartCrawler` API
#[derive(Debug, Clone)]
pub struct GlueCrawler {
    client: GlueClient,
}

impl GlueCrawler {
    /// Wrap an existing Glue client
    pub fn new(client: GlueClient) -> Self {
        Self { client }
    }

    /// Build a client from the default AWS configuration chain
    pub async fn from_env() -> Self {
        let config = aws_config::load_from_env().await;
        Self::new(GlueClient::new(&config))
    }
}

#[async_trait]
impl CatalogTrigger for GlueCrawler {
    async fn start_crawler(&self, name: &str) -> Result<()> {
        match self.client.start_crawler().name(name).send().await {
            Ok(_) => Ok(()),
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_crawler_running_exception() {
                    Err(Error::CrawlerAlreadyRunning {
                        crawler: name.to_string(),
                    })
                } else {
                    Err(Error::crawler(name, service_err.to_string()))
                }
            }
        }
    }

    fn kind(&self) -> &'static str {
        "glue"
    }
}
