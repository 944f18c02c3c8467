//! Catalog crawler trigger
//!
//! After an upload the handler asks a data catalog to re-crawl the output
//! location. The request is fire-and-forget: a successful return only means
//! the crawler was asked to start.

mod glue;
mod webhook;

pub use glue::GlueCrawler;
pub use webhook::WebhookCrawler;

use crate::config::CatalogConfig;
use crate::error::Result;
use async_trait::async_trait;

/// Starts a named catalog crawler
#[async_trait]
pub trait CatalogTrigger: Send + Sync {
    /// Ask the catalog to start the crawler, without waiting for it to finish
    async fn start_crawler(&self, name: &str) -> Result<()>;

    /// Short backend name for logs
    fn kind(&self) -> &'static str;
}

/// Trigger that never contacts a catalog
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledCatalog;

#[async_trait]
impl CatalogTrigger for DisabledCatalog {
    async fn start_crawler(&self, name: &str) -> Result<()> {
        tracing::info!(crawler = name, "Catalog trigger disabled, not starting crawler");
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "disabled"
    }
}

/// Build the trigger described by the catalog configuration
pub async fn catalog_from_config(config: &CatalogConfig) -> Result<Box<dyn CatalogTrigger>> {
    let trigger: Box<dyn CatalogTrigger> = match config {
        CatalogConfig::Glue => Box::new(GlueCrawler::from_env().await),
        CatalogConfig::Webhook { endpoint } => Box::new(WebhookCrawler::new(endpoint)?),
        CatalogConfig::Disabled => Box::new(DisabledCatalog),
    };
    Ok(trigger)
}
