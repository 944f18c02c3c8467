//! Pipeline module
//!
//! Runs one invocation end to end: fetch → flatten → encode → upload →
//! start crawler. Stages run strictly one after another and any failure ends
//! the invocation. Nothing is rolled back, so a crawler failure is reported
//! even though the upload before it already landed.

mod types;

pub use types::{InvocationSummary, Published};

use crate::catalog::CatalogTrigger;
use crate::config::EtlConfig;
use crate::error::{Error, Result};
use crate::event::{ObjectLocation, S3Notification};
use crate::flatten::{flatten_orders, parse_orders};
use crate::output::{encode_parquet, rows_to_batch};
use crate::storage::{destination_key, BucketResolver};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use serde_json::Value;
use tracing::{debug, error, info, warn};

/// Order ETL pipeline with its collaborators injected
pub struct Pipeline {
    /// Bucket to store mapping
    resolver: Box<dyn BucketResolver>,
    /// Crawler trigger
    catalog: Box<dyn CatalogTrigger>,
    /// Handler configuration
    config: EtlConfig,
}

impl Pipeline {
    /// Create a new pipeline
    pub fn new(
        resolver: Box<dyn BucketResolver>,
        catalog: Box<dyn CatalogTrigger>,
        config: EtlConfig,
    ) -> Self {
        Self {
            resolver,
            catalog,
            config,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &EtlConfig {
        &self.config
    }

    /// Handle a storage event using the current wall clock
    pub async fn handle(&self, event: &S3Notification) -> Result<InvocationSummary> {
        self.handle_at(event, Utc::now()).await
    }

    /// Handle a storage event, naming the output after `now`
    pub async fn handle_at(
        &self,
        event: &S3Notification,
        now: DateTime<Utc>,
    ) -> Result<InvocationSummary> {
        let source = event.location()?;
        info!(source = %source, "Processing order file");

        let orders = self.fetch(&source).await?;
        let rows = flatten_orders(&orders)?;
        info!(orders = orders.len(), rows = rows.len(), "Flattened orders");

        let batch = rows_to_batch(&rows)?;
        let published = self.publish(&source.bucket, &batch, now).await?;

        Ok(InvocationSummary {
            source,
            destination: published.destination,
            orders: orders.len(),
            rows: rows.len(),
            bytes: published.bytes,
            crawler: self.config.crawler_name.clone(),
        })
    }

    /// Download an object and parse it as a list of orders
    pub async fn fetch(&self, location: &ObjectLocation) -> Result<Vec<Value>> {
        let store = self.resolver.resolve(&location.bucket)?;
        let data = read_object(store.as_ref(), location).await?;
        debug!("Read {} bytes from {}", data.len(), location);
        parse_orders(&data)
    }

    /// Encode a table, upload it next to the input and start the crawler
    pub async fn publish(
        &self,
        bucket: &str,
        batch: &RecordBatch,
        now: DateTime<Utc>,
    ) -> Result<Published> {
        let data = encode_parquet(batch, &self.config.parquet.writer_config())?;
        let bytes = data.len();
        debug!("Encoded {} rows into {} bytes of Parquet", batch.num_rows(), bytes);

        let key = destination_key(&self.config.output_prefix, &self.config.file_stem, now);
        let destination = ObjectLocation::new(bucket, key);
        let store = self.resolver.resolve(bucket)?;
        write_object(store.as_ref(), &destination, data).await?;
        info!(destination = %destination, bytes, "Uploaded Parquet file");

        let crawler = &self.config.crawler_name;
        if let Err(e) = self.catalog.start_crawler(crawler).await {
            error!(
                crawler = %crawler,
                destination = %destination,
                "Crawler trigger failed after upload, output left in place: {e}"
            );
            return Err(e);
        }
        info!(crawler = %crawler, backend = self.catalog.kind(), "Started crawler");

        Ok(Published { destination, bytes })
    }
}

/// Read an object's full contents
///
/// The key is used as-is, never percent-encoded.
async fn read_object(store: &dyn ObjectStore, location: &ObjectLocation) -> Result<bytes::Bytes> {
    let path = ObjectPath::parse(&location.key).map_err(|e| {
        Error::invalid_event(format!("Object key {:?} is not usable: {e}", location.key))
    })?;
    let read_err = |e: object_store::Error| match e {
        object_store::Error::NotFound { .. } => Error::NotFound {
            bucket: location.bucket.clone(),
            key: location.key.clone(),
        },
        other => Error::Storage {
            bucket: location.bucket.clone(),
            key: location.key.clone(),
            message: other.to_string(),
        },
    };

    let result = store.get(&path).await.map_err(read_err)?;
    result.bytes().await.map_err(read_err)
}

/// Write an object, overwriting whatever is there
///
/// An existing object at the destination means two invocations landed in the
/// same second. That is logged, not prevented.
async fn write_object(
    store: &dyn ObjectStore,
    location: &ObjectLocation,
    data: bytes::Bytes,
) -> Result<()> {
    let upload_err = |message: String| Error::Upload {
        bucket: location.bucket.clone(),
        key: location.key.clone(),
        message,
    };
    let path = ObjectPath::parse(&location.key).map_err(|e| upload_err(e.to_string()))?;

    if let Ok(existing) = store.head(&path).await {
        warn!(
            destination = %location,
            previous_size = existing.size,
            "Destination already exists and will be overwritten"
        );
    }

    store
        .put(&path, data.into())
        .await
        .map_err(|e| upload_err(e.to_string()))?;
    Ok(())
}
