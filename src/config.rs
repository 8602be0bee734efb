//! Configuration management for datawatch
//!
//! This module defines the main `Config` struct and its sub-structs,
//! responsible for holding all routing settings. It uses the `figment`
//! crate to load configuration from a `datawatch.toml` file and merge it
//! with environment variables and command-line arguments.

use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{serde_as, OneOrMany};
use std::path::PathBuf;
use thiserror::Error;

use crate::cli::Cli;

/// A statically detectable configuration problem, raised before any message
/// is routed. Capability names and levels written in configuration must
/// resolve; there is no silent skip.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no {kind} registered under the name '{name}'")]
    UnknownCapability { kind: &'static str, name: String },
    #[error("unknown severity level '{0}'")]
    UnknownLevel(String),
}

/// The main configuration struct for the application.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// The logging level for the application itself (not message severity).
    pub log_level: String,
    /// Where raw records come from before they are wrapped into messages.
    pub source: Option<SourceConfig>,
    /// Declarative filter definitions, compiled into the filter registry.
    #[serde(default)]
    pub filters: Vec<FilterSpec>,
    /// The transport destinations deliveries are dispatched to.
    #[serde(default)]
    pub destinations: Vec<DestinationConfig>,
    /// The message groups, each fanning a batch out to its receivers.
    #[serde(default)]
    pub groups: Vec<GroupConfig>,
}

/// Configuration for the CSV data source.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SourceConfig {
    /// Path to a headered CSV file; one message per row.
    pub csv_path: PathBuf,
}

/// A declarative filter definition.
///
/// Exactly one of `equals` and `pattern` should be set; `equals` compiles to
/// an exact field comparison, `pattern` to a regex match on the field's
/// string form.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FilterSpec {
    /// The registry name receivers refer to this filter by.
    pub name: String,
    /// The record field the filter inspects.
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equals: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

/// Configuration for a single transport destination.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DestinationConfig {
    /// Print rendered payloads to standard output.
    Stdout { name: String },
    /// POST payloads as JSON to a webhook URL.
    Webhook { name: String, webhook_url: String },
}

impl DestinationConfig {
    pub fn name(&self) -> &str {
        match self {
            DestinationConfig::Stdout { name } => name,
            DestinationConfig::Webhook { name, .. } => name,
        }
    }
}

/// One destination's delivery policy within a group.
#[serde_as]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ReceiverConfig {
    /// The destination identifier deliveries for this receiver carry.
    pub dest: String,
    /// Minimum severity level; messages below it are dropped.
    #[serde(default = "default_level")]
    pub level: String,
    /// Name of the formatter to render surviving messages with, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatter: Option<String>,
    /// Filter names, all of which must approve a message. Accepts a single
    /// name or a list in TOML; normalized to a list at parse time.
    #[serde_as(as = "OneOrMany<_>")]
    #[serde(default, alias = "filterer")]
    pub filters: Vec<String>,
}

fn default_level() -> String {
    "NOTSET".to_string()
}

/// A named, ordered set of receivers a batch is fanned out to.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GroupConfig {
    pub name: String,
    pub receivers: Vec<ReceiverConfig>,
}

impl Config {
    /// Loads the application configuration by layering sources: serialized
    /// defaults, the TOML file, `DATAWATCH_`-prefixed environment variables,
    /// and command-line arguments.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(path) = &cli.config {
            figment = figment.merge(Toml::file(path));
        } else {
            figment = figment.merge(Toml::file("datawatch.toml"));
        }

        let config: Config = figment
            .merge(Env::prefixed("DATAWATCH_"))
            .merge(cli.clone())
            .extract()?;
        Ok(config)
    }
}

// Provide a default implementation for tests and easy setup.
impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            source: None,
            filters: vec![],
            destinations: vec![],
            groups: vec![],
        }
    }
}
