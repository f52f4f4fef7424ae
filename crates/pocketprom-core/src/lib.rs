//! pocketprom core: metric aggregation, exposition text, and the persisted
//! counter document shared by the exporter and its host.
//!
//! This crate carries no socket or runtime dependencies. The host's live
//! state reaches it only through the collaborator traits in [`host`], so the
//! store can be driven from a real game server or from a test double.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Every fallible
//! path surfaces as `PocketPromError`/`Result`; a metrics exporter must never
//! take the host process down with it.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod exposition;
pub mod host;
pub mod persisted;
pub mod store;

/// Shared result type.
pub use error::{ErrorKind, PocketPromError, Result};
pub use persisted::{PersistedCounters, PersistedDocument};
pub use store::{MetricSnapshot, MetricsSettings, MetricsStore};
