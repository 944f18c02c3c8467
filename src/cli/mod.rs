//! CLI module
//!
//! Command-line interface for the handler.
//!
//! # Commands
//!
//! - `lambda` - Serve storage events from the Lambda runtime
//! - `invoke` - Run one invocation from an event file
//! - `flatten` - Convert a local orders file to Parquet
//! - `inspect` - Print the rows of a Parquet file

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::Runner;
