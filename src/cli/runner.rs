//! CLI runner - executes commands

use crate::catalog::catalog_from_config;
use crate::cli::commands::{Cli, Commands};
use crate::config::{CatalogConfig, EtlConfig, StorageConfig};
use crate::error::{Error, Result};
use crate::event::S3Notification;
use crate::flatten::{flatten_orders, parse_orders};
use crate::output::{arrow_to_json, decode_parquet, rows_to_batch, write_batch_to_parquet};
use crate::pipeline::{InvocationSummary, Pipeline};
use crate::storage::resolver_from_config;
use bytes::Bytes;
use lambda_runtime::{service_fn, LambdaEvent};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match self.cli.command() {
            Commands::Lambda => self.lambda().await,
            Commands::Invoke {
                event,
                storage_root,
                no_crawler,
            } => {
                self.invoke(event, storage_root.as_deref(), *no_crawler)
                    .await
            }
            Commands::Flatten { input, output } => self.flatten(input, output),
            Commands::Inspect { path } => self.inspect(path),
        }
    }

    /// Load configuration and apply command-line overrides
    pub fn load_config(&self) -> Result<EtlConfig> {
        let mut config = match &self.cli.config {
            Some(path) => EtlConfig::from_file(path)?,
            None => EtlConfig::default(),
        };

        if let Some(name) = &self.cli.crawler_name {
            config = config.with_crawler_name(name);
        }
        if let Some(prefix) = &self.cli.output_prefix {
            config = config.with_output_prefix(prefix);
        }

        config.validate()?;
        Ok(config)
    }

    /// Build the pipeline for a configuration
    async fn build_pipeline(config: EtlConfig) -> Result<Pipeline> {
        let resolver = resolver_from_config(&config.storage);
        let catalog = catalog_from_config(&config.catalog).await?;
        Ok(Pipeline::new(resolver, catalog, config))
    }

    /// Serve invocations from the Lambda runtime until it shuts down
    async fn lambda(&self) -> Result<()> {
        let config = self.load_config()?;
        info!(
            crawler = %config.crawler_name,
            prefix = %config.output_prefix,
            "Starting Lambda handler"
        );
        let pipeline = Arc::new(Self::build_pipeline(config).await?);

        lambda_runtime::run(service_fn(move |event: LambdaEvent<S3Notification>| {
            let pipeline = Arc::clone(&pipeline);
            async move {
                let summary: InvocationSummary = pipeline.handle(&event.payload).await?;
                Ok::<_, lambda_runtime::Error>(summary)
            }
        }))
        .await
        .map_err(|e| Error::config(format!("Lambda runtime failed: {e}")))
    }

    /// Run one invocation from an event file
    async fn invoke(
        &self,
        event_path: &Path,
        storage_root: Option<&Path>,
        no_crawler: bool,
    ) -> Result<()> {
        let mut config = self.load_config()?;
        if let Some(root) = storage_root {
            config = config.with_storage(StorageConfig::Local {
                root: root.to_path_buf(),
            });
        }
        if no_crawler {
            config = config.with_catalog(CatalogConfig::Disabled);
        }

        let content = fs::read_to_string(event_path).map_err(|e| {
            Error::config(format!(
                "Failed to read event file {}: {e}",
                event_path.display()
            ))
        })?;
        let event: S3Notification = serde_json::from_str(&content)?;

        let pipeline = Self::build_pipeline(config).await?;
        let summary = pipeline.handle(&event).await?;
        println!("{}", serde_json::to_string_pretty(&summary)?);
        Ok(())
    }

    /// Flatten a local file into a local Parquet file
    fn flatten(&self, input: &Path, output: &Path) -> Result<()> {
        let config = self.load_config()?;
        let data = fs::read(input)?;
        let orders = parse_orders(&data)?;
        let rows = flatten_orders(&orders)?;
        let batch = rows_to_batch(&rows)?;

        let written = write_batch_to_parquet(
            output,
            &batch,
            Some(&config.parquet.writer_config()),
        )?;
        info!(
            orders = orders.len(),
            rows = written,
            "Wrote {}",
            output.display()
        );
        Ok(())
    }

    /// Print a Parquet file's rows
    fn inspect(&self, path: &Path) -> Result<()> {
        let data = Bytes::from(fs::read(path)?);
        let (schema, batches) = decode_parquet(data)?;

        if self.cli.verbose {
            for field in schema.fields() {
                eprintln!("{}: {}", field.name(), field.data_type());
            }
        }

        for batch in &batches {
            for record in arrow_to_json(batch)? {
                println!("{record}");
            }
        }
        Ok(())
    }
}
