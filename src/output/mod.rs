//! Output module
//!
//! Handles Arrow RecordBatch creation and Parquet encoding.
//!
//! # Overview
//!
//! This module provides utilities for:
//! - Inferring Arrow schemas from flattened order rows
//! - Converting rows to Arrow RecordBatches
//! - Encoding Parquet in memory and decoding it back
//! - Writing Parquet files locally

mod schema;
mod writer;

pub use schema::{arrow_to_json, infer_schema, rows_to_batch};
pub use writer::{
    decode_parquet, encode_parquet, write_batch_to_parquet, ParquetWriter, ParquetWriterConfig,
};

#[cfg(test)]
mod tests;
