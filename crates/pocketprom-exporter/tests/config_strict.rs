#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use pocketprom_exporter::config;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
exporter:
  address: "0.0.0.0"
  prot: 9100 # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.kind().as_str(), "CONFIG");
}

#[test]
fn deny_unknown_top_level_section() {
    let err = config::load_from_str("exporterz: {}\n").expect_err("must fail");
    assert_eq!(err.kind().as_str(), "CONFIG");
}

#[test]
fn ok_minimal_config() {
    let ok = r#"
exporter:
  port: 9200
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.exporter.port, 9200);
    assert_eq!(cfg.exporter.address, "0.0.0.0");
    assert_eq!(cfg.exporter.socket_backlog, 16);
    assert_eq!(cfg.exporter.tick_interval, 20);
    assert!(cfg.metrics.include_memory_details);
}

#[test]
fn empty_document_is_all_defaults() {
    let cfg = config::load_from_str("").expect("must parse");
    assert_eq!(cfg.exporter.port, 9100);
}

#[test]
fn tick_interval_floors_at_one() {
    let cfg = config::load_from_str("exporter:\n  tick_interval: 0\n").expect("must parse");
    assert_eq!(cfg.exporter.effective_tick_interval(), 1);

    let cfg = config::load_from_str("exporter:\n  tick_interval: -5\n").expect("must parse");
    assert_eq!(cfg.exporter.tick_interval, -5);
    assert_eq!(cfg.exporter.effective_tick_interval(), 1);
}

#[test]
fn out_of_range_values_are_rejected() {
    for bad in [
        "exporter:\n  socket_backlog: 0\n",
        "exporter:\n  address: \"  \"\n",
        "exporter:\n  read_timeout_ms: 600000\n",
        "exporter:\n  port: 70000\n",
        "metrics:\n  include_memory_details: maybe\n",
    ] {
        let err = config::load_from_str(bad).expect_err(bad);
        assert_eq!(err.kind().as_str(), "CONFIG", "input={bad}");
    }
}

#[test]
fn ensure_default_writes_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yml");

    assert!(config::ensure_default(&path).unwrap());
    std::fs::write(&path, "exporter:\n  port: 1234\n").unwrap();
    assert!(!config::ensure_default(&path).unwrap());
    assert_eq!(config::load_from_file(&path).unwrap().exporter.port, 1234);
}
