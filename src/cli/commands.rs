//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Orders ETL handler
#[derive(Parser, Debug)]
#[command(name = "orders-etl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short, long, global = true, env = "ETL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Crawler to start after each upload
    #[arg(long, global = true, env = "ETL_CRAWLER_NAME")]
    pub crawler_name: Option<String>,

    /// Key prefix for uploaded Parquet files
    #[arg(long, global = true, env = "ETL_OUTPUT_PREFIX")]
    pub output_prefix: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Defaults to `lambda`, so a custom-runtime bootstrap can run the
    /// binary without arguments
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Subcommand to run
    pub fn command(&self) -> &Commands {
        static DEFAULT: Commands = Commands::Lambda;
        self.command.as_ref().unwrap_or(&DEFAULT)
    }
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve storage events from the Lambda runtime
    Lambda,

    /// Run a single invocation from an event file
    Invoke {
        /// S3 event notification (JSON)
        #[arg(short, long)]
        event: PathBuf,

        /// Treat buckets as directories under this path instead of S3
        #[arg(long)]
        storage_root: Option<PathBuf>,

        /// Skip the crawler trigger
        #[arg(long)]
        no_crawler: bool,
    },

    /// Flatten a local orders file into a local Parquet file
    Flatten {
        /// Orders document (JSON array)
        #[arg(short, long)]
        input: PathBuf,

        /// Parquet file to write
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Print the rows of a Parquet file as JSON lines
    Inspect {
        /// Parquet file to read
        path: PathBuf,
    },
}
