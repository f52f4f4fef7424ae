//! Tick-rate measurement for a host loop.
//!
//! [`TickClock`] keeps the last [`WINDOW`] ticks (spacing between tick starts
//! and time spent working inside the tick) and derives TPS and tick usage the
//! way a game server reports them: TPS is capped at the nominal rate, usage
//! is busy time as a percent of the nominal tick budget.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use pocketprom_core::host::ServerStatus;

/// Ticks averaged over.
pub const WINDOW: usize = 20;

#[derive(Debug, Clone, Copy)]
struct TickSample {
    spacing: Duration,
    busy: Duration,
}

#[derive(Debug)]
pub struct TickClock {
    budget: Duration,
    samples: VecDeque<TickSample>,
}

impl TickClock {
    /// `nominal_tps` is the rate the host aims for (20 for a game server).
    pub fn new(nominal_tps: u32) -> Self {
        let budget = Duration::from_secs(1) / nominal_tps.max(1);
        Self { budget, samples: VecDeque::with_capacity(WINDOW) }
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    pub fn record(&mut self, spacing: Duration, busy: Duration) {
        if self.samples.len() == WINDOW {
            self.samples.pop_front();
        }
        self.samples.push_back(TickSample { spacing, busy });
    }

    pub fn current_tps(&self) -> f64 {
        self.samples.back().map_or(self.nominal_tps(), |s| self.tps_over(s.spacing, 1))
    }

    pub fn average_tps(&self) -> f64 {
        if self.samples.is_empty() {
            return self.nominal_tps();
        }
        let total: Duration = self.samples.iter().map(|s| s.spacing).sum();
        self.tps_over(total, self.samples.len())
    }

    pub fn current_usage(&self) -> f64 {
        self.samples.back().map_or(0.0, |s| self.usage_of(s.busy))
    }

    pub fn average_usage(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let total: f64 = self.samples.iter().map(|s| self.usage_of(s.busy)).sum();
        total / self.samples.len() as f64
    }

    fn nominal_tps(&self) -> f64 {
        1.0 / self.budget.as_secs_f64()
    }

    fn tps_over(&self, elapsed: Duration, ticks: usize) -> f64 {
        let secs = elapsed.as_secs_f64();
        if secs <= 0.0 {
            return self.nominal_tps();
        }
        (ticks as f64 / secs).min(self.nominal_tps())
    }

    fn usage_of(&self, busy: Duration) -> f64 {
        (busy.as_secs_f64() / self.budget.as_secs_f64() * 100.0).min(100.0)
    }
}

/// [`ServerStatus`] for a host that measures itself with a [`TickClock`].
#[derive(Debug)]
pub struct HostStatus {
    clock: Mutex<TickClock>,
    players: AtomicUsize,
}

impl HostStatus {
    pub fn new(nominal_tps: u32) -> Self {
        Self { clock: Mutex::new(TickClock::new(nominal_tps)), players: AtomicUsize::new(0) }
    }

    pub fn record_tick(&self, spacing: Duration, busy: Duration) {
        self.clock.lock().unwrap_or_else(PoisonError::into_inner).record(spacing, busy);
    }

    pub fn set_online_players(&self, n: usize) {
        self.players.store(n, Ordering::Relaxed);
    }

    fn with_clock<T>(&self, f: impl FnOnce(&TickClock) -> T) -> T {
        let clock = self.clock.lock().unwrap_or_else(PoisonError::into_inner);
        f(&*clock)
    }
}

impl ServerStatus for HostStatus {
    fn online_players(&self) -> usize {
        self.players.load(Ordering::Relaxed)
    }
    fn ticks_per_second(&self) -> f64 {
        self.with_clock(TickClock::current_tps)
    }
    fn ticks_per_second_average(&self) -> f64 {
        self.with_clock(TickClock::average_tps)
    }
    fn tick_usage(&self) -> f64 {
        self.with_clock(TickClock::current_usage)
    }
    fn tick_usage_average(&self) -> f64 {
        self.with_clock(TickClock::average_usage)
    }
}
