//! Handler configuration
//!
//! Everything that used to be a literal in the handler (destination prefix,
//! file stem, crawler name) lives here. Configuration can be loaded from YAML
//! and every field has a default, so an empty document is a valid config.

use crate::error::{Error, Result};
use crate::output::ParquetWriterConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete handler configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EtlConfig {
    /// Key prefix that uploaded Parquet files are written under
    #[serde(default = "default_output_prefix")]
    pub output_prefix: String,

    /// File name stem, followed by `_<timestamp>.parquet`
    #[serde(default = "default_file_stem")]
    pub file_stem: String,

    /// Name of the catalog crawler started after each upload
    #[serde(default = "default_crawler_name")]
    pub crawler_name: String,

    /// Where buckets live
    #[serde(default)]
    pub storage: StorageConfig,

    /// How the crawler is started
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Parquet encoding settings
    #[serde(default)]
    pub parquet: ParquetConfig,
}

fn default_output_prefix() -> String {
    "orders_parquet_datalake".to_string()
}

fn default_file_stem() -> String {
    "orders_ETL".to_string()
}

fn default_crawler_name() -> String {
    "etl_pipeline_crawler".to_string()
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            output_prefix: default_output_prefix(),
            file_stem: default_file_stem(),
            crawler_name: default_crawler_name(),
            storage: StorageConfig::default(),
            catalog: CatalogConfig::default(),
            parquet: ParquetConfig::default(),
        }
    }
}

impl EtlConfig {
    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document deserializes to unit, not to an empty map
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_yaml(&content)
    }

    /// Override the crawler name
    #[must_use]
    pub fn with_crawler_name(mut self, name: impl Into<String>) -> Self {
        self.crawler_name = name.into();
        self
    }

    /// Override the output prefix
    #[must_use]
    pub fn with_output_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.output_prefix = prefix.into();
        self
    }

    /// Override the storage backend
    #[must_use]
    pub fn with_storage(mut self, storage: StorageConfig) -> Self {
        self.storage = storage;
        self
    }

    /// Override the catalog trigger
    #[must_use]
    pub fn with_catalog(mut self, catalog: CatalogConfig) -> Self {
        self.catalog = catalog;
        self
    }

    /// Check that the values can produce a usable destination and trigger
    pub fn validate(&self) -> Result<()> {
        if self.crawler_name.trim().is_empty() && self.catalog != CatalogConfig::Disabled {
            return Err(Error::config("crawler_name must not be empty"));
        }
        if self.file_stem.trim().is_empty() {
            return Err(Error::config("file_stem must not be empty"));
        }
        if self.file_stem.contains('/') {
            return Err(Error::config("file_stem must not contain '/'"));
        }
        if self.parquet.row_group_size == 0 {
            return Err(Error::config("parquet.row_group_size must be positive"));
        }
        Ok(())
    }
}

// ============================================================================
// Storage
// ============================================================================

/// Object storage backend selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageConfig {
    /// AWS S3, credentials and region from the environment
    #[default]
    S3,
    /// Local directory where each bucket is a subdirectory
    Local {
        /// Directory holding the bucket directories
        root: PathBuf,
    },
}

// ============================================================================
// Catalog
// ============================================================================

/// Catalog crawler trigger selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CatalogConfig {
    /// AWS Glue `StartCrawler`
    #[default]
    Glue,
    /// HTTP endpoint exposing `POST /crawlers/{name}/start`
    Webhook {
        /// Base URL of the endpoint
        endpoint: String,
    },
    /// Skip the trigger entirely
    Disabled,
}

// ============================================================================
// Parquet
// ============================================================================

/// Parquet compression codec
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompressionCodec {
    #[default]
    Snappy,
    Zstd,
    Gzip,
    Uncompressed,
}

/// Parquet encoding settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParquetConfig {
    #[serde(default)]
    pub compression: CompressionCodec,

    #[serde(default = "default_row_group_size")]
    pub row_group_size: usize,
}

fn default_row_group_size() -> usize {
    1024 * 1024
}

impl Default for ParquetConfig {
    fn default() -> Self {
        Self {
            compression: CompressionCodec::default(),
            row_group_size: default_row_group_size(),
        }
    }
}

impl ParquetConfig {
    /// Build the writer configuration used by the encoder
    pub fn writer_config(&self) -> ParquetWriterConfig {
        let config = ParquetWriterConfig::new().with_row_group_size(self.row_group_size);
        match self.compression {
            CompressionCodec::Snappy => config,
            CompressionCodec::Zstd => config.zstd(),
            CompressionCodec::Gzip => config.gzip(),
            CompressionCodec::Uncompressed => config.uncompressed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = EtlConfig::default();
        assert_eq!(config.output_prefix, "orders_parquet_datalake");
        assert_eq!(config.file_stem, "orders_ETL");
        assert_eq!(config.crawler_name, "etl_pipeline_crawler");
        assert_eq!(config.storage, StorageConfig::S3);
        assert_eq!(config.catalog, CatalogConfig::Glue);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(EtlConfig::from_yaml("").unwrap(), EtlConfig::default());
        assert_eq!(EtlConfig::from_yaml("{}").unwrap(), EtlConfig::default());
    }

    #[test]
    fn test_full_yaml() {
        let yaml = r"
output_prefix: curated/orders
file_stem: orders
crawler_name: curated_crawler
storage:
  type: local
  root: /tmp/buckets
catalog:
  type: webhook
  endpoint: http://localhost:9000
parquet:
  compression: zstd
  row_group_size: 1000
";
        let config = EtlConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.output_prefix, "curated/orders");
        assert_eq!(config.file_stem, "orders");
        assert_eq!(config.crawler_name, "curated_crawler");
        assert_eq!(
            config.storage,
            StorageConfig::Local {
                root: PathBuf::from("/tmp/buckets")
            }
        );
        assert_eq!(
            config.catalog,
            CatalogConfig::Webhook {
                endpoint: "http://localhost:9000".to_string()
            }
        );
        assert_eq!(config.parquet.compression, CompressionCodec::Zstd);
        assert_eq!(config.parquet.writer_config().row_group_size(), 1000);
    }

    #[test]
    fn test_disabled_catalog() {
        let config = EtlConfig::from_yaml("catalog:\n  type: disabled\n").unwrap();
        assert_eq!(config.catalog, CatalogConfig::Disabled);
    }

    #[test]
    fn test_validate_rejects_empty_crawler() {
        let config = EtlConfig::default().with_crawler_name("  ");
        assert!(matches!(config.validate(), Err(Error::Config { .. })));

        // Allowed when nothing is triggered
        let config = config.with_catalog(CatalogConfig::Disabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_stem() {
        let mut config = EtlConfig::default();
        config.file_stem = "a/b".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_storage_type() {
        let result = EtlConfig::from_yaml("storage:\n  type: ftp\n");
        assert!(matches!(result, Err(Error::YamlParse(_))));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("etl.yaml");
        std::fs::write(&path, "crawler_name: from_file\n").unwrap();
        let config = EtlConfig::from_file(&path).unwrap();
        assert_eq!(config.crawler_name, "from_file");

        let missing = EtlConfig::from_file(dir.path().join("nope.yaml"));
        assert!(matches!(missing, Err(Error::Config { .. })));
    }
}
