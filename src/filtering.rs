//! Built-in message filters and the compilation of declarative filter
//! definitions into a registry.
//!
//! Filters here cover the common cases for structured check records: exact
//! field comparison, regex matching on a field's string form, and required
//! field presence. Anything beyond that is supplied by the surrounding
//! system through the registry.

use crate::config::FilterSpec;
use crate::core::{Message, MessageFilter};
use crate::registry::FilterRegistry;
use anyhow::{bail, Context, Result};
use regex::Regex;
use serde_json::Value;
use std::sync::Arc;

/// Keeps messages whose named field equals a fixed value.
pub struct FieldEqualsFilter {
    field: String,
    value: Value,
}

impl FieldEqualsFilter {
    pub fn new(field: impl Into<String>, value: Value) -> Self {
        Self {
            field: field.into(),
            value,
        }
    }
}

impl MessageFilter for FieldEqualsFilter {
    fn filter(&self, message: &Message) -> Result<bool> {
        Ok(message.field(&self.field) == Some(&self.value))
    }
}

/// Keeps messages whose named field matches a compiled regex.
///
/// Non-string field values are matched against their JSON string form; a
/// missing field never matches.
pub struct FieldRegexFilter {
    field: String,
    regex: Regex,
}

impl FieldRegexFilter {
    pub fn new(field: impl Into<String>, pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)
            .with_context(|| format!("failed to compile filter pattern '{}'", pattern))?;
        Ok(Self {
            field: field.into(),
            regex,
        })
    }
}

impl MessageFilter for FieldRegexFilter {
    fn filter(&self, message: &Message) -> Result<bool> {
        let matched = match message.field(&self.field) {
            Some(Value::String(s)) => self.regex.is_match(s),
            Some(other) => self.regex.is_match(&other.to_string()),
            None => false,
        };
        Ok(matched)
    }
}

/// Keeps messages that carry every one of the named fields.
pub struct HasFieldsFilter {
    fields: Vec<String>,
}

impl HasFieldsFilter {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

impl MessageFilter for HasFieldsFilter {
    fn filter(&self, message: &Message) -> Result<bool> {
        Ok(self.fields.iter().all(|f| message.field(f).is_some()))
    }
}

/// Compiles declarative filter definitions into a registry.
///
/// Each spec becomes either an exact-comparison or a regex filter; a spec
/// with both or neither of `equals`/`pattern` is rejected, as is a pattern
/// that fails to compile.
pub fn build_registry(specs: &[FilterSpec]) -> Result<FilterRegistry> {
    let mut registry = FilterRegistry::filters();
    for spec in specs {
        let filter: Arc<dyn MessageFilter> = match (&spec.equals, &spec.pattern) {
            (Some(value), None) => {
                Arc::new(FieldEqualsFilter::new(spec.field.clone(), value.clone()))
            }
            (None, Some(pattern)) => Arc::new(
                FieldRegexFilter::new(spec.field.clone(), pattern)
                    .with_context(|| format!("in filter '{}'", spec.name))?,
            ),
            _ => bail!(
                "filter '{}' must set exactly one of 'equals' or 'pattern'",
                spec.name
            ),
        };
        registry.register(spec.name.clone(), filter);
    }
    Ok(registry)
}
