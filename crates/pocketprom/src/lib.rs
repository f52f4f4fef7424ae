//! Top-level facade crate for pocketprom.
//!
//! Re-exports the metrics core and the exporter so a host can depend on a single crate.

pub mod core {
    pub use pocketprom_core::*;
}

pub mod exporter {
    pub use pocketprom_exporter::*;
}
