//! Error types for the orders ETL handler
//!
//! Every stage returns `Result<T, Error>`. Nothing is caught inside the
//! pipeline: errors surface to the invoking runtime unchanged.

use thiserror::Error;

/// The main error type for the orders ETL handler
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    // ============================================================================
    // Trigger Event Errors
    // ============================================================================
    #[error("Invalid trigger event: {message}")]
    InvalidEvent { message: String },

    // ============================================================================
    // Fetch Errors
    // ============================================================================
    #[error("Object not found: s3://{bucket}/{key}")]
    NotFound { bucket: String, key: String },

    #[error("Storage read failed for s3://{bucket}/{key}: {message}")]
    Storage {
        bucket: String,
        key: String,
        message: String,
    },

    #[error("Failed to decode object as UTF-8: {message}")]
    Decode { message: String },

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Flatten Errors
    // ============================================================================
    #[error("Missing field: {path}")]
    MissingField { path: String },

    #[error("Expected {expected} at {path}")]
    InvalidShape { path: String, expected: String },

    // ============================================================================
    // Arrow/Parquet Errors
    // ============================================================================
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Output error: {message}")]
    Output { message: String },

    // ============================================================================
    // Publish Errors
    // ============================================================================
    #[error("Upload to s3://{bucket}/{key} failed: {message}")]
    Upload {
        bucket: String,
        key: String,
        message: String,
    },

    #[error("Failed to start crawler '{crawler}': {message}")]
    CrawlerTrigger { crawler: String, message: String },

    #[error("Crawler '{crawler}' is already running")]
    CrawlerAlreadyRunning { crawler: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid event error
    pub fn invalid_event(message: impl Into<String>) -> Self {
        Self::InvalidEvent {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(path: impl Into<String>) -> Self {
        Self::MissingField { path: path.into() }
    }

    /// Create an invalid shape error
    pub fn invalid_shape(path: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::InvalidShape {
            path: path.into(),
            expected: expected.into(),
        }
    }

    /// Create an output error
    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }

    /// Create a crawler trigger error
    pub fn crawler(crawler: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CrawlerTrigger {
            crawler: crawler.into(),
            message: message.into(),
        }
    }

    /// Check if this error means the source object does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Check if this error came from the catalog trigger stage
    pub fn is_crawler_error(&self) -> bool {
        matches!(
            self,
            Error::CrawlerTrigger { .. } | Error::CrawlerAlreadyRunning { .. }
        )
    }
}

/// Result type alias for the orders ETL handler
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::missing_field("orders[0].customer.email");
        assert_eq!(err.to_string(), "Missing field: orders[0].customer.email");

        let err = Error::NotFound {
            bucket: "raw".to_string(),
            key: "orders.json".to_string(),
        };
        assert_eq!(err.to_string(), "Object not found: s3://raw/orders.json");

        let err = Error::CrawlerAlreadyRunning {
            crawler: "etl_pipeline_crawler".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Crawler 'etl_pipeline_crawler' is already running"
        );
    }

    #[test]
    fn test_classification() {
        let not_found = Error::NotFound {
            bucket: "b".to_string(),
            key: "k".to_string(),
        };
        assert!(not_found.is_not_found());
        assert!(!not_found.is_crawler_error());

        assert!(Error::crawler("c", "boom").is_crawler_error());
        assert!(Error::CrawlerAlreadyRunning {
            crawler: "c".to_string()
        }
        .is_crawler_error());
        assert!(!Error::output("x").is_crawler_error());
    }

    #[test]
    fn test_json_error_conversion() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: Error = parse.unwrap_err().into();
        assert!(matches!(err, Error::JsonParse(_)));
        assert!(err.to_string().starts_with("Failed to parse JSON"));
    }
}
