//! Data-source collaborators.
//!
//! Sources run before the routing core: they pull raw records from an
//! external store and wrap them into `Message`s. The core itself never
//! performs I/O.

use crate::core::Message;
use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::info;

/// Produces a batch of messages from an external store.
pub trait MessageSource: Send + Sync {
    fn fetch(&self) -> Result<Vec<Message>>;
}

/// A source that reads a headered CSV file, one message per row.
///
/// Every cell becomes a string field keyed by its column header; a `level`
/// column becomes the message severity.
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl MessageSource for CsvSource {
    fn fetch(&self) -> Result<Vec<Message>> {
        let mut reader = csv::Reader::from_path(&self.path)
            .with_context(|| format!("failed to open CSV source: {}", self.path.display()))?;
        let headers = reader.headers()?.clone();

        let mut messages = Vec::new();
        for result in reader.records() {
            let row = result
                .with_context(|| format!("malformed row in {}", self.path.display()))?;
            let mut fields = Map::new();
            for (header, cell) in headers.iter().zip(row.iter()) {
                fields.insert(header.to_string(), Value::String(cell.to_string()));
            }
            messages.push(Message::new(fields));
        }

        info!(
            path = %self.path.display(),
            count = messages.len(),
            "loaded messages from CSV source"
        );
        Ok(messages)
    }
}
