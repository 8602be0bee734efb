//! The routing core: per-destination receivers and group fan-out.
//!
//! A `Receiver` applies one destination's delivery policy (filter chain,
//! level threshold, optional formatter) to a batch of messages; a `Group`
//! fans a batch out to every receiver it is configured with and collects the
//! delivery tuples in configuration order. Nothing here performs I/O and no
//! state survives between calls.

use crate::config::{ConfigError, GroupConfig, ReceiverConfig};
use crate::core::{Delivery, Level, Message, MessageFilter, MessageFormatter, Payload, Rendered};
use crate::registry::{FilterRegistry, FormatterRegistry};
use anyhow::Result;
use std::sync::Arc;
use tracing::debug;

/// One destination's delivery policy, with every configured capability name
/// already resolved to a live instance.
pub struct Receiver {
    dest: String,
    min_level: Level,
    filters: Vec<Arc<dyn MessageFilter>>,
    formatter: Option<Arc<dyn MessageFormatter>>,
}

impl Receiver {
    /// Builds a receiver from its configuration, resolving the formatter and
    /// every filter name against the registries.
    ///
    /// Resolution happens here, not at deliver time: an unknown capability
    /// name or level written in configuration fails before any message moves.
    pub fn new(
        config: &ReceiverConfig,
        formatters: &FormatterRegistry,
        filters: &FilterRegistry,
    ) -> Result<Self, ConfigError> {
        let min_level = Level::from_name(&config.level)
            .ok_or_else(|| ConfigError::UnknownLevel(config.level.clone()))?;

        let formatter = match &config.formatter {
            Some(name) => Some(formatters.resolve(name)?),
            None => None,
        };

        let filters = config
            .filters
            .iter()
            .map(|name| filters.resolve(name))
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Self {
            dest: config.dest.clone(),
            min_level,
            filters,
            formatter,
        })
    }

    /// The destination identifier this receiver delivers to.
    pub fn dest(&self) -> &str {
        &self.dest
    }

    /// Keeps the messages every filter approves. With no filters configured
    /// the batch passes through untouched; this stage knows nothing about
    /// severity.
    fn filter_batch(&self, messages: &[Message]) -> Result<Vec<Message>> {
        let mut kept = Vec::with_capacity(messages.len());
        'next: for message in messages {
            for filter in &self.filters {
                if !filter.filter(message)? {
                    continue 'next;
                }
            }
            kept.push(message.clone());
        }
        Ok(kept)
    }

    /// Runs the full policy over a batch: filter, then level threshold, then
    /// format. Returns the delivery tuple for this receiver's destination.
    ///
    /// A filter or formatter failure propagates to the caller; there is no
    /// partial-delivery recovery at this layer.
    pub fn deliver(&self, messages: &[Message], subject: Option<&str>) -> Result<Delivery> {
        let approved = self.filter_batch(messages)?;

        let threshold = self.min_level.rank();
        let survivors: Vec<Message> = approved
            .into_iter()
            .filter(|m| m.level_no() >= threshold)
            .collect();

        debug!(
            dest = %self.dest,
            total = messages.len(),
            kept = survivors.len(),
            min_level = %self.min_level,
            "filtered message batch"
        );

        let rendered = match &self.formatter {
            Some(formatter) => survivors
                .iter()
                .map(|m| formatter.format(m).map(Rendered::Text))
                .collect::<Result<Vec<_>>>()?,
            None => survivors.into_iter().map(Rendered::Raw).collect(),
        };

        Ok(Delivery {
            dest: self.dest.clone(),
            payload: Payload {
                subject: subject.map(str::to_string),
                messages: rendered,
            },
        })
    }
}

/// A named, ordered fan-out of one batch to many receivers.
///
/// Receivers are constructed fresh on every `deliver` call, so capability
/// resolution happens anew each time and the shared registries can be
/// swapped between calls.
pub struct Group {
    name: String,
    receivers: Vec<ReceiverConfig>,
    formatters: Arc<FormatterRegistry>,
    filters: Arc<FilterRegistry>,
}

impl Group {
    pub fn new(
        name: impl Into<String>,
        receivers: Vec<ReceiverConfig>,
        formatters: Arc<FormatterRegistry>,
        filters: Arc<FilterRegistry>,
    ) -> Self {
        Self {
            name: name.into(),
            receivers,
            formatters,
            filters,
        }
    }

    pub fn from_config(
        config: &GroupConfig,
        formatters: Arc<FormatterRegistry>,
        filters: Arc<FilterRegistry>,
    ) -> Self {
        Self::new(
            config.name.clone(),
            config.receivers.clone(),
            formatters,
            filters,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Delivers a batch to every configured receiver, in configuration
    /// order. The first receiver error aborts the remaining receivers and
    /// propagates; there is deliberately no per-receiver isolation.
    pub fn deliver(&self, messages: &[Message], subject: Option<&str>) -> Result<Vec<Delivery>> {
        debug!(
            group = %self.name,
            receivers = self.receivers.len(),
            batch = messages.len(),
            "delivering batch to group"
        );

        let mut deliveries = Vec::with_capacity(self.receivers.len());
        for config in &self.receivers {
            let receiver = Receiver::new(config, &self.formatters, &self.filters)?;
            deliveries.push(receiver.deliver(messages, subject)?);
        }
        Ok(deliveries)
    }
}
