// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;
use std::time::Duration;

#[test]
#[serial]
fn defaults_without_config_file() {
    let dir = tempfile::tempdir().unwrap();
    std::env::set_var("VALOR_STATE_DIR", dir.path());

    let config = Config::load().unwrap();

    assert_eq!(config.state_dir, dir.path());
    assert_eq!(config.store_dir, dir.path().join("store"));
    assert_eq!(config.restart_flag_path, dir.path().join("restart.flag"));
    assert_eq!(config.agent.command, "claude");
    assert_eq!(config.engine.max_auto_continues, 3);
    assert!(config.engine.workspace_root.is_none());

    std::env::remove_var("VALOR_STATE_DIR");
}

#[test]
#[serial]
fn config_file_overrides_defaults() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("config.toml"),
        r#"
[agent]
command = "my-agent"
args = ["--quiet"]

[classifier]
command = "my-classify"
timeout_secs = 10

[engine]
session_timeout_secs = 600
workspace_root = "/srv/work"

[watchdog]
silence_threshold_secs = 45
error_cascade_limit = 5
"#,
    )
    .unwrap();
    std::env::set_var("VALOR_STATE_DIR", dir.path());

    let config = Config::load().unwrap();

    assert_eq!(config.agent.command, "my-agent");
    assert_eq!(config.agent.args, vec!["--quiet"]);
    assert_eq!(config.classifier.command, "my-classify");
    assert_eq!(config.classifier.timeout, Duration::from_secs(10));
    assert_eq!(config.engine.session_timeout, Duration::from_secs(600));
    assert_eq!(
        config.engine.workspace_root.as_deref(),
        Some(std::path::Path::new("/srv/work"))
    );
    assert_eq!(
        config.engine.watchdog.silence_threshold,
        Duration::from_secs(45)
    );
    assert_eq!(config.engine.watchdog.error_cascade_limit, 5);
    // Untouched values keep their defaults
    assert_eq!(config.engine.watchdog.sweep_interval, Duration::from_secs(30));

    std::env::remove_var("VALOR_STATE_DIR");
}

#[test]
#[serial]
fn unknown_keys_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("config.toml"),
        "[engine]\nsesion_timeout_secs = 600\n",
    )
    .unwrap();
    std::env::set_var("VALOR_STATE_DIR", dir.path());

    assert!(matches!(Config::load(), Err(ConfigError::Parse(_))));

    std::env::remove_var("VALOR_STATE_DIR");
}
