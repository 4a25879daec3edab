//! Configuration file loading.

use agentwatch_server::config::Config;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.port, 8787);
    assert_eq!(config.tick_interval_ms, 1000);
    assert_eq!(config.presence.idle_timeout_ms, 30_000);
    assert_eq!(config.narrative.min_len, 15);
    assert_eq!(config.narrative.accept_len, 20);
}

#[test]
fn test_partial_file_keeps_defaults() {
    let file = write_config(
        r#"
port = 9000

[narrative]
min_len = 10
"#,
    );
    let config = Config::load_from(file.path()).unwrap();
    assert_eq!(config.port, 9000);
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.narrative.min_len, 10);
    assert_eq!(config.narrative.accept_len, 20);
    assert_eq!(config.presence.idle_timeout_ms, 30_000);
}

#[test]
fn test_full_file() {
    let file = write_config(
        r#"
host = "0.0.0.0"
port = 8080
tick_interval_ms = 250
max_workers = 4
max_log_entries = 100

[presence]
idle_timeout_ms = 5000

[narrative]
min_len = 10
accept_len = 15
"#,
    );
    let config = Config::load_from(file.path()).unwrap();
    assert_eq!(config.tick_interval().as_millis(), 250);
    assert_eq!(config.presence.idle_timeout_ms, 5000);
    let registry = config.registry_config();
    assert_eq!(registry.max_workers, 4);
    assert_eq!(registry.max_log_entries, 100);
}

#[test]
fn test_zero_tick_interval_is_clamped() {
    let file = write_config("tick_interval_ms = 0\n");
    let config = Config::load_from(file.path()).unwrap();
    assert_eq!(config.tick_interval().as_millis(), 1);
}

#[test]
fn test_invalid_file_is_error() {
    let file = write_config("port = \"not a number\"\n");
    assert!(Config::load_from(file.path()).is_err());
}

#[test]
fn test_missing_file_is_error() {
    assert!(Config::load_from(std::path::Path::new("/nonexistent/agentwatch.toml")).is_err());
}
