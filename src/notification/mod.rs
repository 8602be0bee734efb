//! Handles the transmission of deliveries to their destinations.
//!
//! The routing core stops at `Delivery` tuples; this module takes them the
//! last mile. A `Dispatcher` matches each delivery's destination id against
//! the registered `Destination` implementations and sends. Transmission is
//! best-effort: no retries, no acknowledgement, no batching.

pub mod webhook;

use crate::core::{Delivery, Destination, Rendered};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Routes deliveries to destinations by name.
pub struct Dispatcher {
    destinations: HashMap<String, Arc<dyn Destination>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            destinations: HashMap::new(),
        }
    }

    /// Registers a destination under its own name.
    pub fn register(&mut self, destination: Arc<dyn Destination>) -> &mut Self {
        self.destinations
            .insert(destination.name().to_string(), destination);
        self
    }

    /// Sends each delivery to the destination its `dest` names.
    ///
    /// A delivery addressed to an unregistered destination is logged,
    /// counted, and skipped; the router has already done its job and the
    /// remaining deliveries still go out. Returns the number of skipped
    /// deliveries. A destination's send failure, by contrast, propagates.
    pub async fn dispatch(&self, deliveries: &[Delivery]) -> Result<usize> {
        let mut skipped = 0;
        for delivery in deliveries {
            match self.destinations.get(&delivery.dest) {
                Some(destination) => {
                    destination.send(delivery).await?;
                    info!(
                        dest = %delivery.dest,
                        messages = delivery.payload.messages.len(),
                        "dispatched delivery"
                    );
                }
                None => {
                    skipped += 1;
                    warn!(
                        dest = %delivery.dest,
                        "no destination registered for delivery, skipping"
                    );
                }
            }
        }
        if skipped > 0 {
            warn!(skipped, "deliveries skipped for lack of a destination");
        }
        Ok(skipped)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// A destination that prints rendered payloads to standard output.
pub struct StdoutDestination {
    name: String,
}

impl StdoutDestination {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl Destination for StdoutDestination {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&self, delivery: &Delivery) -> Result<()> {
        if let Some(subject) = &delivery.payload.subject {
            println!("== {} ==", subject);
        }
        for rendered in &delivery.payload.messages {
            match rendered {
                Rendered::Text(text) => println!("{}", text),
                Rendered::Raw(message) => {
                    println!("{}", serde_json::to_string(message.fields())?)
                }
            }
        }
        Ok(())
    }
}
