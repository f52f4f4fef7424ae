use serde::Deserialize;
use pocketprom_core::error::{PocketPromError, Result};
use pocketprom_core::MetricsSettings;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterConfig {
    #[serde(default)]
    pub exporter: ExporterSection,

    #[serde(default)]
    pub metrics: MetricsSection,
}

impl ExporterConfig {
    pub fn validate(&self) -> Result<()> {
        self.exporter.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterSection {
    #[serde(default = "default_address")]
    pub address: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_socket_backlog")]
    pub socket_backlog: u32,

    /// Host ticks between refreshes. Values below 1, negatives included,
    /// behave as 1.
    #[serde(default = "default_tick_interval")]
    pub tick_interval: i64,

    /// Deadline for reading one request, 0 = wait forever.
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

impl Default for ExporterSection {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
            socket_backlog: default_socket_backlog(),
            tick_interval: default_tick_interval(),
            read_timeout_ms: default_read_timeout_ms(),
        }
    }
}

impl ExporterSection {
    pub fn validate(&self) -> Result<()> {
        if self.address.trim().is_empty() {
            return Err(PocketPromError::Config("exporter.address must not be empty".into()));
        }
        if !(1..=65535).contains(&self.socket_backlog) {
            return Err(PocketPromError::Config(
                "exporter.socket_backlog must be between 1 and 65535".into(),
            ));
        }
        if self.read_timeout_ms > 60000 {
            return Err(PocketPromError::Config(
                "exporter.read_timeout_ms must be at most 60000".into(),
            ));
        }
        Ok(())
    }

    pub fn effective_tick_interval(&self) -> u32 {
        u32::try_from(self.tick_interval.max(1)).unwrap_or(u32::MAX)
    }
}

fn default_address() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    9100
}
fn default_socket_backlog() -> u32 {
    16
}
fn default_tick_interval() -> i64 {
    20
}
fn default_read_timeout_ms() -> u64 {
    1000
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    #[serde(default = "default_include_memory_details")]
    pub include_memory_details: bool,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self { include_memory_details: default_include_memory_details() }
    }
}

impl MetricsSection {
    pub fn settings(&self) -> MetricsSettings {
        MetricsSettings { include_memory_details: self.include_memory_details }
    }
}

fn default_include_memory_details() -> bool {
    true
}
