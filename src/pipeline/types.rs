//! Pipeline types

use crate::event::ObjectLocation;
use serde::{Deserialize, Serialize};

/// What one invocation did, returned as the handler response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationSummary {
    /// Object the orders were read from
    pub source: ObjectLocation,
    /// Object the Parquet file was written to
    pub destination: ObjectLocation,
    /// Orders in the input document
    pub orders: usize,
    /// Rows in the output table
    pub rows: usize,
    /// Size of the uploaded file
    pub bytes: usize,
    /// Crawler that was started
    pub crawler: String,
}

/// Result of the publish stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    /// Where the file was written
    pub destination: ObjectLocation,
    /// Size of the uploaded file
    pub bytes: usize,
}
