//! Host collaborator interfaces.
//!
//! The game server owns the live state; the exporter only reads it through
//! these traits. Implementations must answer from already-available
//! in-process values and never block.

/// Live server status (player count, tick rate, tick usage).
pub trait ServerStatus {
    /// Number of players currently online.
    fn online_players(&self) -> usize;
    /// Ticks per second over the most recent tick.
    fn ticks_per_second(&self) -> f64;
    /// Ticks per second averaged over the host's window.
    fn ticks_per_second_average(&self) -> f64;
    /// Percent of the tick budget used by the most recent tick.
    fn tick_usage(&self) -> f64;
    /// Percent of the tick budget used, averaged over the host's window.
    fn tick_usage_average(&self) -> f64;
}

/// A joining player's network session.
pub trait PlayerSession {
    /// Round-trip latency in milliseconds.
    fn ping_ms(&self) -> i64;
}

/// One reading of process memory, in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemorySample {
    /// Memory the process is actively using (resident set).
    pub usage_bytes: u64,
    /// Memory reserved from the OS, including pages not yet touched.
    pub real_bytes: u64,
    /// Highest `usage_bytes` seen so far.
    pub peak_bytes: u64,
}

/// Source of process memory readings.
pub trait MemoryProbe {
    fn sample(&mut self) -> MemorySample;
}

/// Probe that always reports zero. Used when the host has no memory source.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullMemoryProbe;

impl MemoryProbe for NullMemoryProbe {
    fn sample(&mut self) -> MemorySample {
        MemorySample::default()
    }
}
