//! Object storage access
//!
//! The handler only learns which bucket it works on when an event arrives,
//! so stores are resolved per bucket through a `BucketResolver`. The output
//! file always goes back into the bucket the input came from.

use crate::config::StorageConfig;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::ObjectStore;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Build the destination key for an upload
///
/// Format: `{prefix}/{stem}_{YYYYMMDD_HHMMSS}.parquet`. The timestamp has
/// second granularity, so two uploads in the same second share a key.
pub fn destination_key(prefix: &str, stem: &str, now: DateTime<Utc>) -> String {
    let timestamp = now.format("%Y%m%d_%H%M%S");
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        format!("{stem}_{timestamp}.parquet")
    } else {
        format!("{prefix}/{stem}_{timestamp}.parquet")
    }
}

/// Maps a bucket name to the object store that serves it
pub trait BucketResolver: Send + Sync {
    /// Get the store for a bucket
    fn resolve(&self, bucket: &str) -> Result<Arc<dyn ObjectStore>>;
}

/// Build the resolver described by the storage configuration
pub fn resolver_from_config(config: &StorageConfig) -> Box<dyn BucketResolver> {
    match config {
        StorageConfig::S3 => Box::new(S3Buckets),
        StorageConfig::Local { root } => Box::new(LocalBuckets::new(root.clone())),
    }
}

// ============================================================================
// S3
// ============================================================================

/// AWS S3 buckets, credentials and region read from the environment
#[derive(Debug, Clone, Copy, Default)]
pub struct S3Buckets;

impl BucketResolver for S3Buckets {
    fn resolve(&self, bucket: &str) -> Result<Arc<dyn ObjectStore>> {
        let store = AmazonS3Builder::from_env()
            .with_bucket_name(bucket)
            .build()
            .map_err(|e| Error::config(format!("Failed to create S3 client for {bucket}: {e}")))?;
        Ok(Arc::new(store))
    }
}

// ============================================================================
// Local filesystem
// ============================================================================

/// Local directories standing in for buckets
///
/// Bucket `b` maps to `{root}/b`, which is created on first use.
#[derive(Debug, Clone)]
pub struct LocalBuckets {
    root: PathBuf,
}

impl LocalBuckets {
    /// Create a resolver rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory that backs a bucket
    pub fn bucket_dir(&self, bucket: &str) -> Result<PathBuf> {
        if bucket.is_empty()
            || bucket.contains('/')
            || bucket.contains('\\')
            || bucket == "."
            || bucket == ".."
        {
            return Err(Error::config(format!("Invalid bucket name: {bucket:?}")));
        }
        Ok(self.root.join(bucket))
    }
}

impl BucketResolver for LocalBuckets {
    fn resolve(&self, bucket: &str) -> Result<Arc<dyn ObjectStore>> {
        let dir = self.bucket_dir(bucket)?;
        std::fs::create_dir_all(&dir).map_err(|e| {
            Error::config(format!("Failed to create directory {}: {e}", dir.display()))
        })?;

        let store = LocalFileSystem::new_with_prefix(&dir)
            .map_err(|e| Error::config(format!("Failed to create local store: {e}")))?;
        Ok(Arc::new(store))
    }
}

// ============================================================================
// Static
// ============================================================================

/// Fixed set of pre-built stores, keyed by bucket name
#[derive(Debug, Clone, Default)]
pub struct StaticBuckets {
    stores: HashMap<String, Arc<dyn ObjectStore>>,
}

impl StaticBuckets {
    /// Create an empty resolver
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a store for a bucket
    #[must_use]
    pub fn with_bucket(mut self, bucket: impl Into<String>, store: Arc<dyn ObjectStore>) -> Self {
        self.stores.insert(bucket.into(), store);
        self
    }
}

impl BucketResolver for StaticBuckets {
    fn resolve(&self, bucket: &str) -> Result<Arc<dyn ObjectStore>> {
        self.stores
            .get(bucket)
            .cloned()
            .ok_or_else(|| Error::config(format!("No store registered for bucket {bucket}")))
    }
}
