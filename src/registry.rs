//! Capability registries.
//!
//! The surrounding system supplies two read-mostly maps, formatter name to
//! formatter and filter name to filter. Receivers resolve configured names
//! against them at construction time and never mutate them, so a registry
//! can be shared (`Arc`) across every receiver of every group.

use crate::config::ConfigError;
use crate::core::{MessageFilter, MessageFormatter};
use std::collections::HashMap;
use std::sync::Arc;

/// A name-to-capability map with fail-fast resolution.
///
/// An explicitly configured name that is missing from its registry is a
/// configuration error, surfaced before any message moves. There is no
/// silent fallback to "no capability".
pub struct Registry<T: ?Sized> {
    kind: &'static str,
    entries: HashMap<String, Arc<T>>,
}

pub type FormatterRegistry = Registry<dyn MessageFormatter>;
pub type FilterRegistry = Registry<dyn MessageFilter>;

impl FormatterRegistry {
    pub fn formatters() -> Self {
        Self::with_kind("formatter")
    }
}

impl FilterRegistry {
    pub fn filters() -> Self {
        Self::with_kind("filter")
    }
}

impl<T: ?Sized> Registry<T> {
    fn with_kind(kind: &'static str) -> Self {
        Self {
            kind,
            entries: HashMap::new(),
        }
    }

    /// Registers a capability under a name, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, capability: Arc<T>) -> &mut Self {
        self.entries.insert(name.into(), capability);
        self
    }

    /// Resolves a configured name to its live capability.
    pub fn resolve(&self, name: &str) -> Result<Arc<T>, ConfigError> {
        self.entries
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownCapability {
                kind: self.kind,
                name: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<T: ?Sized> Default for Registry<T> {
    fn default() -> Self {
        Self::with_kind("capability")
    }
}
