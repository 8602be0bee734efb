//! Command-Line Interface (CLI) argument parsing.
//!
//! This module defines the command-line arguments for the application using the
//! `clap` crate. These arguments are parsed at startup and then merged with
//! the configuration from the `datawatch.toml` file and environment variables.

use clap::Parser;
use figment::{
    providers::Serialized,
    value::{Dict, Map},
    Error, Figment, Metadata, Profile, Provider,
};
use std::path::PathBuf;

/// A message-routing layer for data-quality notifications.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Logging level for the application (overrides the config file).
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Path to a CSV file to read records from (overrides the config file).
    #[arg(long, value_name = "FILE")]
    pub csv: Option<PathBuf>,

    /// Subject line attached to every delivery of this run.
    #[arg(long, value_name = "TEXT")]
    pub subject: Option<String>,
}

impl Provider for Cli {
    fn metadata(&self) -> Metadata {
        Metadata::named("Command-Line Arguments")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut figment = Figment::new();

        if let Some(level) = &self.log_level {
            figment = figment.merge(Serialized::default("log_level", level));
        }

        if let Some(path) = &self.csv {
            figment = figment.merge(Serialized::default(
                "source.csv_path",
                path.display().to_string(),
            ));
        }

        figment.data()
    }
}
