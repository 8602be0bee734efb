//! datawatch - data-quality notification router
//!
//! Reads structured check records from a configured source, routes them
//! through the configured message groups, and dispatches the resulting
//! deliveries to their destinations.

use anyhow::{bail, Result};
use clap::Parser;
use datawatch::{
    cli::Cli,
    config::{Config, DestinationConfig},
    filtering, formatting,
    notification::{webhook::WebhookDestination, Dispatcher, StdoutDestination},
    routing::Group,
    sources::{CsvSource, MessageSource},
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration by layering sources: defaults, file, environment, and CLI args.
    let config = Config::load(&cli).unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        // Exit if configuration fails, as it's a critical step.
        std::process::exit(1);
    });

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .init();

    info!("datawatch starting up...");
    info!("Log Level: {}", config.log_level);
    info!("Groups: {}", config.groups.len());
    info!("Destinations: {}", config.destinations.len());
    info!("Declared Filters: {}", config.filters.len());

    // Capability registries, shared by every group.
    let formatters = Arc::new(formatting::builtin_registry());
    let filters = Arc::new(filtering::build_registry(&config.filters)?);

    // Transport layer.
    let mut dispatcher = Dispatcher::new();
    for dest_config in &config.destinations {
        match dest_config {
            DestinationConfig::Stdout { name } => {
                dispatcher.register(Arc::new(StdoutDestination::new(name.clone())));
            }
            DestinationConfig::Webhook { name, webhook_url } => {
                dispatcher.register(Arc::new(WebhookDestination::new(
                    name.clone(),
                    webhook_url.clone(),
                )?));
            }
        }
    }

    // Pull the batch from the data source.
    let Some(source_config) = &config.source else {
        bail!("no data source configured; set [source] in the config or pass --csv");
    };
    let source = CsvSource::new(&source_config.csv_path);
    let messages = source.fetch()?;
    info!("Fetched {} messages", messages.len());

    // Route and dispatch, group by group, in configuration order.
    for group_config in &config.groups {
        let group = Group::from_config(group_config, formatters.clone(), filters.clone());
        match group.deliver(&messages, cli.subject.as_deref()) {
            Ok(deliveries) => {
                dispatcher.dispatch(&deliveries).await?;
            }
            Err(err) => {
                error!(group = %group.name(), error = %err, "group delivery failed");
                return Err(err);
            }
        }
    }

    info!("datawatch finished");
    Ok(())
}
