//! Metrics aggregation store.
//!
//! Holds a flat snapshot of the host's counters and gauges: no history, no
//! labels. Gauges are refreshed by [`MetricsStore::update`] from the host's
//! live status; counters move only through the `record_*` hooks and are seeded
//! from the persisted document at construction.

use std::sync::Arc;

use crate::exposition::ExpositionWriter;
use crate::host::{MemoryProbe, MemorySample, ServerStatus};
use crate::persisted::PersistedCounters;

pub const PLAYERS_ONLINE: &str = "pocketmine_players_online";
pub const JOINS_TOTAL: &str = "pocketmine_joins_total";
pub const QUITS_TOTAL: &str = "pocketmine_quits_total";
pub const LAST_JOIN_PING_MS: &str = "pocketmine_last_join_ping_ms";
pub const TPS_CURRENT: &str = "pocketmine_tps_current";
pub const TPS_AVERAGE: &str = "pocketmine_tps_average";
pub const TICK_USAGE_CURRENT: &str = "pocketmine_tick_usage_current";
pub const TICK_USAGE_AVERAGE: &str = "pocketmine_tick_usage_average";
pub const MEMORY_USAGE_BYTES: &str = "pocketmine_memory_usage_bytes";
pub const MEMORY_REAL_BYTES: &str = "pocketmine_memory_real_bytes";
pub const MEMORY_PEAK_BYTES: &str = "pocketmine_memory_peak_bytes";

/// Every metric name [`MetricsStore::render`] can emit, in render order.
pub const METRIC_NAMES: [&str; 11] = [
    PLAYERS_ONLINE,
    JOINS_TOTAL,
    QUITS_TOTAL,
    LAST_JOIN_PING_MS,
    TPS_CURRENT,
    TPS_AVERAGE,
    TICK_USAGE_CURRENT,
    TICK_USAGE_AVERAGE,
    MEMORY_USAGE_BYTES,
    MEMORY_REAL_BYTES,
    MEMORY_PEAK_BYTES,
];

/// Store-level options taken from the `metrics` config section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSettings {
    pub include_memory_details: bool,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self { include_memory_details: true }
    }
}

/// Current observable state.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSnapshot {
    pub joins: u64,
    pub quits: u64,
    pub players_online: u64,
    pub last_join_ping_ms: Option<i64>,
    pub current_tps: f64,
    pub average_tps: f64,
    pub current_tick_usage_percent: f64,
    pub average_tick_usage_percent: f64,
    pub memory: MemorySample,
}

impl Default for MetricSnapshot {
    fn default() -> Self {
        // A host that has not been sampled yet is assumed healthy (20 TPS, idle).
        Self {
            joins: 0,
            quits: 0,
            players_online: 0,
            last_join_ping_ms: None,
            current_tps: 20.0,
            average_tps: 20.0,
            current_tick_usage_percent: 0.0,
            average_tick_usage_percent: 0.0,
            memory: MemorySample::default(),
        }
    }
}

pub struct MetricsStore {
    status: Arc<dyn ServerStatus + Send + Sync>,
    memory: Box<dyn MemoryProbe + Send>,
    settings: MetricsSettings,
    snapshot: MetricSnapshot,
}

impl MetricsStore {
    /// Build a store seeded from previously persisted counters, if any.
    pub fn new(
        status: Arc<dyn ServerStatus + Send + Sync>,
        memory: Box<dyn MemoryProbe + Send>,
        settings: MetricsSettings,
        persisted: Option<PersistedCounters>,
    ) -> Self {
        let mut snapshot = MetricSnapshot::default();
        if let Some(p) = persisted {
            tracing::debug!(joins = p.joins, quits = p.quits, "restored persisted counters");
            snapshot.joins = p.joins;
            snapshot.quits = p.quits;
            snapshot.last_join_ping_ms = p.last_join_ping;
        }
        Self { status, memory, settings, snapshot }
    }

    /// Refresh every gauge from the host. Never fails, never blocks.
    pub fn update(&mut self) {
        let s = &mut self.snapshot;
        s.players_online = u64::try_from(self.status.online_players()).unwrap_or(u64::MAX);
        s.current_tps = self.status.ticks_per_second();
        s.average_tps = self.status.ticks_per_second_average();
        s.current_tick_usage_percent = self.status.tick_usage();
        s.average_tick_usage_percent = self.status.tick_usage_average();

        if self.settings.include_memory_details {
            s.memory = self.memory.sample();
        }
    }

    pub fn record_player_join(&mut self, ping_ms: i64) {
        self.snapshot.joins = self.snapshot.joins.saturating_add(1);
        self.snapshot.last_join_ping_ms = Some(ping_ms);
    }

    pub fn record_player_quit(&mut self) {
        self.snapshot.quits = self.snapshot.quits.saturating_add(1);
    }

    pub fn set_include_memory_details(&mut self, enabled: bool) {
        self.settings.include_memory_details = enabled;
    }

    pub fn settings(&self) -> MetricsSettings {
        self.settings
    }

    pub fn snapshot(&self) -> &MetricSnapshot {
        &self.snapshot
    }

    /// Read-only projection for the save path.
    pub fn persistent_snapshot(&self) -> PersistedCounters {
        PersistedCounters {
            joins: self.snapshot.joins,
            quits: self.snapshot.quits,
            last_join_ping: self.snapshot.last_join_ping_ms,
        }
    }

    /// Serialize the snapshot as exposition text. Metric order is fixed.
    pub fn render(&self) -> String {
        let s = &self.snapshot;
        let mut w = ExpositionWriter::new();

        w.gauge(PLAYERS_ONLINE, "Online players", s.players_online);
        w.counter(JOINS_TOTAL, "Player joins", s.joins);
        w.counter(QUITS_TOTAL, "Player quits", s.quits);
        if let Some(ping) = s.last_join_ping_ms {
            w.gauge(LAST_JOIN_PING_MS, "Ping of the last player to join", ping);
        }
        w.gauge(TPS_CURRENT, "Current server TPS", s.current_tps);
        w.gauge(TPS_AVERAGE, "Average server TPS", s.average_tps);
        w.gauge(
            TICK_USAGE_CURRENT,
            "Current server tick usage percent",
            s.current_tick_usage_percent,
        );
        w.gauge(
            TICK_USAGE_AVERAGE,
            "Average server tick usage percent",
            s.average_tick_usage_percent,
        );

        if self.settings.include_memory_details {
            w.gauge(MEMORY_USAGE_BYTES, "Process memory usage", s.memory.usage_bytes);
            w.gauge(
                MEMORY_REAL_BYTES,
                "Real memory allocated by the process",
                s.memory.real_bytes,
            );
            w.gauge(MEMORY_PEAK_BYTES, "Peak memory usage", s.memory.peak_bytes);
        }

        w.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::NullMemoryProbe;

    struct Idle;

    impl ServerStatus for Idle {
        fn online_players(&self) -> usize {
            0
        }
        fn ticks_per_second(&self) -> f64 {
            20.0
        }
        fn ticks_per_second_average(&self) -> f64 {
            20.0
        }
        fn tick_usage(&self) -> f64 {
            0.0
        }
        fn tick_usage_average(&self) -> f64 {
            0.0
        }
    }

    fn store(persisted: Option<PersistedCounters>) -> MetricsStore {
        MetricsStore::new(
            Arc::new(Idle),
            Box::new(NullMemoryProbe),
            MetricsSettings::default(),
            persisted,
        )
    }

    #[test]
    fn counters_seed_from_persisted() {
        let p = PersistedCounters { joins: 4, quits: 3, last_join_ping: Some(12) };
        let s = store(Some(p));
        assert_eq!(s.persistent_snapshot(), p);
    }

    #[test]
    fn quit_keeps_last_ping() {
        let mut s = store(None);
        s.record_player_join(37);
        s.record_player_quit();
        assert_eq!(s.snapshot().last_join_ping_ms, Some(37));
        assert_eq!(s.snapshot().joins, 1);
        assert_eq!(s.snapshot().quits, 1);
    }

    #[test]
    fn unsampled_gauges_default_healthy() {
        let out = store(None).render();
        assert!(out.contains("pocketmine_tps_current 20\n"));
        assert!(out.contains("pocketmine_tick_usage_average 0\n"));
    }

    #[test]
    fn render_does_not_mutate() {
        let mut s = store(None);
        s.record_player_join(5);
        let before = s.snapshot().clone();
        let a = s.render();
        let b = s.render();
        assert_eq!(a, b);
        assert_eq!(s.snapshot(), &before);
    }
}
