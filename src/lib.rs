//! datawatch - a message-routing layer for data-quality notifications
//!
//! This library wraps structured check records into severity-ranked
//! messages, filters and formats them per destination, fans them out to
//! configured groups of receivers, and hands the resulting delivery tuples
//! to a transport layer for transmission.

pub mod cli;
pub mod config;
pub mod core;
pub mod filtering;
pub mod formatting;
pub mod notification;
pub mod registry;
pub mod routing;
pub mod sources;

// Re-export core types for convenience
pub use core::*;
