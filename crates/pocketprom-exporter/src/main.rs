//! Standalone pocketprom host.
//!
//! Runs a 20 Hz tick loop that measures itself and drives the exporter the
//! way an embedding game server would. Useful for trying the endpoint and
//! for scraper configuration without a real server.
//!
//! Usage: `pocketprom-exporter [DATA_DIR]` (default `pocketprom-data`).

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing_subscriber::{fmt, EnvFilter};

use pocketprom_exporter::clock::HostStatus;
use pocketprom_exporter::Exporter;

const HOST_TPS: u32 = 20;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let data_dir = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from("pocketprom-data"), PathBuf::from);

    let status = Arc::new(HostStatus::new(HOST_TPS));
    let mut exporter = match Exporter::enable(&data_dir, status.clone()) {
        Ok(e) => e,
        Err(e) => {
            tracing::error!(error = %e, kind = e.kind().as_str(), "exporter failed to start");
            std::process::exit(1);
        }
    };

    let mut ticker = interval(Duration::from_secs(1) / HOST_TPS);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last = Instant::now();

    tracing::info!(data_dir = %data_dir.display(), "host loop running, Ctrl-C to stop");
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let start = Instant::now();
                exporter.on_host_tick();
                status.record_tick(start - last, start.elapsed());
                last = start;
            }
            _ = &mut shutdown => break,
        }
    }

    tracing::info!("shutting down");
    exporter.disable();
}
