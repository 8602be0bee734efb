// src/formatting.rs

use crate::core::{Message, MessageFormatter};
use anyhow::{anyhow, Result};
use chrono::DateTime;
use serde_json::Value;

/// A formatter that renders a check-result message as a short multi-line
/// report, suitable for email bodies and chat posts.
///
/// Expects the record to carry `check_status`, `table_name`, `db`,
/// `check_time` and `details`; a missing field is a value error that
/// propagates out of the delivery.
pub struct HumanReadableFormatter;

impl HumanReadableFormatter {
    fn required<'a>(message: &'a Message, name: &str) -> Result<&'a Value> {
        message
            .field(name)
            .ok_or_else(|| anyhow!("record is missing the '{}' field", name))
    }
}

impl MessageFormatter for HumanReadableFormatter {
    fn format(&self, message: &Message) -> Result<String> {
        let status = Self::required(message, "check_status")?;
        let table = Self::required(message, "table_name")?;
        let db = Self::required(message, "db")?;
        let time = Self::required(message, "check_time")?;
        let details = Self::required(message, "details")?;

        Ok(format!(
            "{} on {} ({})\nTime: {}\nDetails: {}",
            display(status),
            display(table),
            display(db),
            timestamp_string(time),
            display(details),
        ))
    }
}

/// A formatter that renders the raw record as text, rewriting any RFC 3339
/// timestamp values into the compact `YYYY-MM-DD HH:MM:SS` form first.
pub struct TimestampFormatter;

impl MessageFormatter for TimestampFormatter {
    fn format(&self, message: &Message) -> Result<String> {
        let rendered: Vec<String> = message
            .fields()
            .iter()
            .map(|(k, v)| format!("{}: {}", k, timestamp_string(v)))
            .collect();
        Ok(rendered.join(", "))
    }
}

/// A formatter that renders the raw record as compact JSON.
pub struct JsonFormatter;

impl MessageFormatter for JsonFormatter {
    fn format(&self, message: &Message) -> Result<String> {
        Ok(serde_json::to_string(message.fields())?)
    }
}

/// Renders a JSON value without the quotes `Value`'s `Display` puts around
/// strings.
fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Compacts an RFC 3339 timestamp value to `YYYY-MM-DD HH:MM:SS`; anything
/// that does not parse as a timestamp renders as-is.
fn timestamp_string(value: &Value) -> String {
    if let Value::String(s) = value {
        if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
            return ts.format("%Y-%m-%d %H:%M:%S").to_string();
        }
    }
    display(value)
}

/// The formatters shipped with the crate, registered under their
/// configuration names.
pub fn builtin_registry() -> crate::registry::FormatterRegistry {
    use std::sync::Arc;

    let mut registry = crate::registry::FormatterRegistry::formatters();
    registry
        .register("human_readable", Arc::new(HumanReadableFormatter))
        .register("timestamp", Arc::new(TimestampFormatter))
        .register("json", Arc::new(JsonFormatter));
    registry
}
