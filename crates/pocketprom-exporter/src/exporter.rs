//! Exporter lifecycle: the glue a host plugin calls into.
//!
//! Owns the metrics store, the scrape server and the persistence file, and
//! maps host callbacks (enable, tick, player join/quit, disable) onto them.
//! Everything runs on the host's tick thread; the store sits behind a mutex
//! only because the server's render callback and the event hooks both need
//! to reach it.

use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use pocketprom_core::error::{PocketPromError, Result};
use pocketprom_core::host::{MemoryProbe, PlayerSession, ServerStatus};
use pocketprom_core::{MetricsStore, PersistedCounters};

use crate::config::{self, ExporterConfig};
use crate::memory::SysinfoMemoryProbe;
use crate::persistence::PersistenceFile;
use crate::server::{ExpositionServer, ServerOptions};

pub const CONFIG_FILE: &str = "config.yml";

pub struct Exporter {
    store: Arc<Mutex<MetricsStore>>,
    server: ExpositionServer,
    persistence: PersistenceFile,
    tick_interval: u32,
    ticks_since_refresh: u32,
}

impl Exporter {
    /// Enable from a data directory: create it, write the default config if
    /// missing, then load `config.yml` and start.
    pub fn enable(data_dir: &Path, status: Arc<dyn ServerStatus + Send + Sync>) -> Result<Self> {
        fs::create_dir_all(data_dir)?;
        let config_path = data_dir.join(CONFIG_FILE);
        if config::ensure_default(&config_path)? {
            tracing::info!(path = %config_path.display(), "wrote default exporter config");
        }
        let cfg = config::load_from_file(&config_path)?;
        Self::with_config(cfg, data_dir, status, Box::new(SysinfoMemoryProbe::new()))
    }

    /// Start with an already-loaded config. Only an invalid config or an
    /// unusable data directory is an error; a bind failure just leaves the
    /// endpoint disabled.
    pub fn with_config(
        cfg: ExporterConfig,
        data_dir: &Path,
        status: Arc<dyn ServerStatus + Send + Sync>,
        memory: Box<dyn MemoryProbe + Send>,
    ) -> Result<Self> {
        cfg.validate()?;
        if !data_dir.is_dir() {
            return Err(PocketPromError::Config(format!(
                "data directory {} does not exist",
                data_dir.display()
            )));
        }

        let mut persistence = PersistenceFile::new(data_dir);
        let persisted = persistence.load();

        let mut store = MetricsStore::new(status, memory, cfg.metrics.settings(), persisted);
        store.update();
        let store = Arc::new(Mutex::new(store));

        let ex = &cfg.exporter;
        let opts = ServerOptions {
            address: ex.address.clone(),
            port: ex.port,
            backlog: ex.socket_backlog,
            read_timeout: (ex.read_timeout_ms > 0)
                .then(|| Duration::from_millis(ex.read_timeout_ms)),
        };
        let render_store = Arc::clone(&store);
        let server = ExpositionServer::bind(&opts, Box::new(move || lock(&render_store).render()));

        if server.is_ready() {
            let port = server.local_addr().map_or(ex.port, |a| a.port());
            tracing::info!("Prometheus endpoint on http://{}:{}/metrics", ex.address, port);
        } else {
            tracing::warn!(
                "Prometheus exporter failed to bind socket, metrics endpoint is disabled"
            );
        }

        let mut exporter = Self {
            store,
            server,
            persistence,
            tick_interval: ex.effective_tick_interval(),
            ticks_since_refresh: 0,
        };
        if exporter.persistence.is_dirty() {
            exporter.save();
        }
        Ok(exporter)
    }

    /// Host tick hook. Refreshes every `tick_interval` calls.
    pub fn on_host_tick(&mut self) {
        self.ticks_since_refresh += 1;
        if self.ticks_since_refresh >= self.tick_interval {
            self.ticks_since_refresh = 0;
            self.refresh();
        }
    }

    /// Pull fresh gauges, then answer pending scrapes.
    pub fn refresh(&mut self) -> usize {
        lock(&self.store).update();
        self.server.tick()
    }

    pub fn on_player_join(&mut self, player: &dyn PlayerSession) {
        lock(&self.store).record_player_join(player.ping_ms());
        self.mark_dirty();
    }

    pub fn on_player_quit(&mut self) {
        lock(&self.store).record_player_quit();
        self.mark_dirty();
    }

    pub fn set_include_memory_details(&mut self, enabled: bool) {
        lock(&self.store).set_include_memory_details(enabled);
    }

    pub fn is_serving(&self) -> bool {
        self.server.is_ready()
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.local_addr()
    }

    pub fn tick_interval(&self) -> u32 {
        self.tick_interval
    }

    pub fn persistent_snapshot(&self) -> PersistedCounters {
        lock(&self.store).persistent_snapshot()
    }

    pub fn render(&self) -> String {
        lock(&self.store).render()
    }

    /// Final save and socket close.
    pub fn disable(mut self) {
        self.save();
        self.server.shutdown();
    }

    fn mark_dirty(&mut self) {
        self.persistence.mark_dirty();
        self.save();
    }

    fn save(&mut self) {
        let snapshot = lock(&self.store).persistent_snapshot();
        self.persistence.save(&snapshot);
    }
}

fn lock(store: &Mutex<MetricsStore>) -> MutexGuard<'_, MetricsStore> {
    store.lock().unwrap_or_else(PoisonError::into_inner)
}
