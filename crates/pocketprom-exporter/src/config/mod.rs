//! Exporter config loader (strict parsing).

pub mod schema;

use std::fs;
use std::path::Path;

use pocketprom_core::error::{PocketPromError, Result};

pub use schema::{ExporterConfig, ExporterSection, MetricsSection};

/// Bundled default, written on first start.
pub const DEFAULT_CONFIG_YAML: &str = "\
exporter:
  # Address the metrics endpoint binds to.
  address: \"0.0.0.0\"
  port: 9100
  socket_backlog: 16
  # Host ticks between metric refreshes (20 ticks = 1 second).
  tick_interval: 20
  # Give up on a scrape request that stalls longer than this (0 = never).
  read_timeout_ms: 1000

metrics:
  include_memory_details: true
";

pub fn load_from_file(path: &Path) -> Result<ExporterConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| PocketPromError::Config(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ExporterConfig> {
    // An empty file parses as YAML null; treat it as "all defaults".
    if s.trim().is_empty() {
        return Ok(ExporterConfig::default());
    }
    let cfg: ExporterConfig = serde_yaml::from_str(s)
        .map_err(|e| PocketPromError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Write [`DEFAULT_CONFIG_YAML`] to `path` unless a file is already there.
/// Returns whether a file was written.
pub fn ensure_default(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    fs::write(path, DEFAULT_CONFIG_YAML)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_default_matches_builtin_defaults() {
        let Ok(cfg) = load_from_str(DEFAULT_CONFIG_YAML) else {
            unreachable!("default config must parse");
        };
        assert_eq!(cfg.exporter.address, "0.0.0.0");
        assert_eq!(cfg.exporter.port, 9100);
        assert_eq!(cfg.exporter.socket_backlog, 16);
        assert_eq!(cfg.exporter.tick_interval, 20);
        assert_eq!(cfg.exporter.read_timeout_ms, 1000);
        assert!(cfg.metrics.include_memory_details);
    }
}
