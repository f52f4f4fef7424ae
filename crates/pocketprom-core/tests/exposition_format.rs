//! Exposition text produced by `MetricsStore::render`.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::atomic::Ordering;
use std::sync::Arc;

use pocketprom_core::store::METRIC_NAMES;

mod common;
use common::{store_with, FakeStatus};

fn sample_names(text: &str) -> Vec<&str> {
    text.lines()
        .filter(|l| !l.starts_with('#'))
        .map(|l| l.split(' ').next().unwrap())
        .collect()
}

#[test]
fn ends_with_single_newline_and_known_names_only() {
    let status = Arc::new(FakeStatus::default());
    let mut store = store_with(status, true, None);
    store.record_player_join(12);
    store.update();
    let out = store.render();

    assert!(out.ends_with('\n'));
    assert!(!out.ends_with("\n\n"));
    for name in sample_names(&out) {
        assert!(METRIC_NAMES.contains(&name), "unexpected metric {name}");
    }
}

#[test]
fn fixed_metric_order() {
    let status = Arc::new(FakeStatus::default());
    let mut store = store_with(status, true, None);
    store.record_player_join(1);
    store.update();

    assert_eq!(sample_names(&store.render()), METRIC_NAMES.to_vec());
}

#[test]
fn every_sample_has_help_and_type() {
    let status = Arc::new(FakeStatus::default());
    let store = store_with(status, true, None);
    let out = store.render();
    let lines: Vec<&str> = out.lines().collect();

    assert_eq!(lines.len() % 3, 0);
    for block in lines.chunks(3) {
        let name = block[2].split(' ').next().unwrap();
        assert!(block[0].starts_with(&format!("# HELP {name} ")));
        let kind = if name.ends_with("_total") { "counter" } else { "gauge" };
        assert_eq!(block[1], format!("# TYPE {name} {kind}"));
    }
}

#[test]
fn gauges_follow_latest_update() {
    let status = Arc::new(FakeStatus::default());
    let mut store = store_with(Arc::clone(&status), false, None);

    status.players.store(7, Ordering::Relaxed);
    *status.tps.lock().unwrap() = (19.5, 19.87);
    *status.usage.lock().unwrap() = (42.25, 12.0);
    store.update();
    let out = store.render();

    assert!(out.contains("pocketmine_players_online 7\n"));
    assert!(out.contains("pocketmine_tps_current 19.5\n"));
    assert!(out.contains("pocketmine_tps_average 19.87\n"));
    assert!(out.contains("pocketmine_tick_usage_current 42.25\n"));
    assert!(out.contains("pocketmine_tick_usage_average 12\n"));

    status.players.store(2, Ordering::Relaxed);
    store.update();
    assert!(store.render().contains("pocketmine_players_online 2\n"));
}

#[test]
fn memory_metrics_follow_flag() {
    let status = Arc::new(FakeStatus::default());
    let mut store = store_with(status, false, None);
    store.update();
    assert!(!store.render().contains("pocketmine_memory_"));

    store.set_include_memory_details(true);
    store.update();
    let out = store.render();
    assert!(out.contains("pocketmine_memory_usage_bytes 1024\n"));
    assert!(out.contains("pocketmine_memory_real_bytes 4096\n"));
    assert!(out.contains("pocketmine_memory_peak_bytes 8192\n"));

    store.set_include_memory_details(false);
    store.update();
    assert!(!store.render().contains("pocketmine_memory_"));
}

#[test]
fn last_join_ping_survives_quit() {
    let status = Arc::new(FakeStatus::default());
    let mut store = store_with(status, false, None);
    assert!(!store.render().contains("pocketmine_last_join_ping_ms"));

    store.record_player_join(37);
    assert!(store.render().contains("pocketmine_last_join_ping_ms 37\n"));

    store.record_player_quit();
    let out = store.render();
    assert!(out.contains("pocketmine_last_join_ping_ms 37\n"));
    assert!(out.contains("pocketmine_quits_total 1\n"));
}
