//! Core domain types and capability traits for datawatch
//!
//! This module defines the fundamental data structures and trait contracts
//! that govern component interactions throughout the routing pipeline.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The fixed severity lexicon, ordered from least to most severe.
///
/// Ranks mirror the conventional logging scale so thresholds read naturally
/// in configuration: `NOTSET` admits everything, `CRITICAL` almost nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    #[default]
    Notset,
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Level {
    /// The integer rank used for threshold comparisons.
    pub fn rank(&self) -> u8 {
        match self {
            Level::Notset => 0,
            Level::Debug => 10,
            Level::Info => 20,
            Level::Warning => 30,
            Level::Error => 40,
            Level::Critical => 50,
        }
    }

    /// Parses a level name, case-insensitively. Returns `None` for names
    /// outside the lexicon; callers decide whether that is tolerable
    /// (message data) or fatal (configuration).
    pub fn from_name(name: &str) -> Option<Level> {
        match name.to_ascii_uppercase().as_str() {
            "NOTSET" => Some(Level::Notset),
            "DEBUG" => Some(Level::Debug),
            "INFO" => Some(Level::Info),
            "WARNING" => Some(Level::Warning),
            "ERROR" => Some(Level::Error),
            "CRITICAL" => Some(Level::Critical),
            _ => None,
        }
    }

    /// The canonical upper-case name of the level.
    pub fn name(&self) -> &'static str {
        match self {
            Level::Notset => "NOTSET",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A single structured record moving through the pipeline.
///
/// Wraps a raw JSON object and the severity derived from its `level` field.
/// The rank is always recomputed from the level at construction; a missing or
/// unrecognized `level` defaults to `NOTSET`. Messages are value objects:
/// created per batch, consumed by a delivery, and discarded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    level: Level,
    fields: Map<String, Value>,
}

// Deserialization goes through `Message::new` so the severity is always
// re-derived from the record's `level` field, never taken from the wire.
impl<'de> Deserialize<'de> for Message {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Repr {
            fields: Map<String, Value>,
        }

        let repr = Repr::deserialize(deserializer)?;
        Ok(Message::new(repr.fields))
    }
}

impl Message {
    /// Wraps a raw record, deriving the severity from its `level` field.
    pub fn new(fields: Map<String, Value>) -> Self {
        let level = fields
            .get("level")
            .and_then(Value::as_str)
            .and_then(Level::from_name)
            .unwrap_or_default();
        Self { level, fields }
    }

    /// Convenience constructor for a JSON value; non-object values become a
    /// record with a single `message` field.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::new(map),
            other => {
                let mut map = Map::new();
                map.insert("message".to_string(), other);
                Self::new(map)
            }
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    /// The integer severity rank, derived from the level.
    pub fn level_no(&self) -> u8 {
        self.level.rank()
    }

    /// The raw record this message wraps.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Looks up a single field of the raw record.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// A message after the format stage: either rendered text, or the original
/// message passed through untouched when no formatter is configured.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Rendered {
    Text(String),
    Raw(Message),
}

/// The payload half of a delivery tuple.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payload {
    pub subject: Option<String>,
    pub messages: Vec<Rendered>,
}

/// What a receiver hands back: the destination id and the filtered,
/// formatted batch. Actual transmission happens outside the core.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Delivery {
    pub dest: String,
    pub payload: Payload,
}

// =============================================================================
// Capability traits
// =============================================================================

/// Decides whether a message should be kept for a destination.
///
/// A receiver may carry any number of filters; a message survives only if
/// every filter approves it. An `Err` is a capability failure and propagates
/// uncaught through the delivery.
pub trait MessageFilter: Send + Sync {
    fn filter(&self, message: &Message) -> Result<bool>;
}

/// Renders a message into its displayable form for a destination.
///
/// At most one formatter per receiver; with none configured the receiver
/// passes `Message` values through and defers rendering to the destination.
pub trait MessageFormatter: Send + Sync {
    fn format(&self, message: &Message) -> Result<String>;
}

/// Transmits a delivery to the outside world.
///
/// Transport collaborator, not part of the routing core: the core produces
/// `Delivery` tuples and a dispatcher feeds them to destinations.
#[async_trait]
pub trait Destination: Send + Sync {
    /// A unique, descriptive name for the destination (e.g. "stdout",
    /// "ops-webhook"). Matched against `Delivery::dest` when dispatching.
    fn name(&self) -> &str;

    /// Sends one delivery.
    ///
    /// # Returns
    /// * `Ok(())` if the payload was handed off
    /// * `Err` if transmission failed (network error, serialization error, etc.)
    async fn send(&self, delivery: &Delivery) -> Result<()>;
}
