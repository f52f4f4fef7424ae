//! pocketprom exporter library entry.
//!
//! Wires the metrics store from `pocketprom-core` to a non-blocking scrape
//! endpoint, a YAML config, and a JSON counter file. A host embeds it through
//! [`exporter::Exporter`] and drives it from its own tick loop; nothing here
//! spawns a thread or a task.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod clock;
pub mod config;
pub mod exporter;
pub mod memory;
pub mod persistence;
pub mod server;

pub use exporter::Exporter;
