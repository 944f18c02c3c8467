//! # Orders ETL
//!
//! Storage-event handler that turns a JSON document of orders into a flat
//! Parquet table.
//!
//! ## Flow
//!
//! ```text
//! S3 event ──► fetch ──► flatten ──► encode ──► upload ──► start crawler
//!             (JSON)   (order ×     (Parquet,  (same       (fire and
//!                       product)     in memory) bucket)      forget)
//! ```
//!
//! Each order contributes one row per product; order and customer fields are
//! repeated on every row. Every stage runs to completion before the next
//! starts, and the first error ends the invocation.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use orders_etl::{EtlConfig, Pipeline, S3Notification};
//! use orders_etl::catalog::DisabledCatalog;
//! use orders_etl::storage::LocalBuckets;
//!
//! let pipeline = Pipeline::new(
//!     Box::new(LocalBuckets::new("/tmp/buckets")),
//!     Box::new(DisabledCatalog),
//!     EtlConfig::default(),
//! );
//! let event = S3Notification::for_object("raw", "orders.json");
//! let summary = pipeline.handle(&event).await?;
//! println!("wrote {} rows to {}", summary.rows, summary.destination);
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Handler configuration
pub mod config;

/// Storage event payload
pub mod event;

/// Order flattening
pub mod flatten;

/// Arrow/Parquet output
pub mod output;

/// Object storage access
pub mod storage;

/// Catalog crawler trigger
pub mod catalog;

/// Invocation pipeline
pub mod pipeline;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::EtlConfig;
pub use error::{Error, Result};
pub use event::{ObjectLocation, S3Notification};
pub use flatten::{flatten_orders, parse_orders, FlatRow, ORDER_COLUMNS};
pub use pipeline::{InvocationSummary, Pipeline};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
