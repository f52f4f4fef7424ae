//! Host doubles shared by the core integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use pocketprom_core::host::{MemoryProbe, MemorySample, ServerStatus};
use pocketprom_core::{MetricsSettings, MetricsStore, PersistedCounters};

#[derive(Default)]
pub struct FakeStatus {
    pub players: AtomicUsize,
    pub tps: Mutex<(f64, f64)>,
    pub usage: Mutex<(f64, f64)>,
}

impl ServerStatus for FakeStatus {
    fn online_players(&self) -> usize {
        self.players.load(Ordering::Relaxed)
    }
    fn ticks_per_second(&self) -> f64 {
        self.tps.lock().map(|t| t.0).unwrap_or_default()
    }
    fn ticks_per_second_average(&self) -> f64 {
        self.tps.lock().map(|t| t.1).unwrap_or_default()
    }
    fn tick_usage(&self) -> f64 {
        self.usage.lock().map(|t| t.0).unwrap_or_default()
    }
    fn tick_usage_average(&self) -> f64 {
        self.usage.lock().map(|t| t.1).unwrap_or_default()
    }
}

pub struct FixedMemory(pub MemorySample);

impl MemoryProbe for FixedMemory {
    fn sample(&mut self) -> MemorySample {
        self.0
    }
}

pub fn store_with(
    status: Arc<FakeStatus>,
    include_memory_details: bool,
    persisted: Option<PersistedCounters>,
) -> MetricsStore {
    let memory = FixedMemory(MemorySample {
        usage_bytes: 1024,
        real_bytes: 4096,
        peak_bytes: 8192,
    });
    MetricsStore::new(
        status,
        Box::new(memory),
        MetricsSettings { include_memory_details },
        persisted,
    )
}
