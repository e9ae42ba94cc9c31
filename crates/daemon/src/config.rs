// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration.
//!
//! Defaults work out of the box; a `config.toml` in the state directory
//! overrides them. Durations are plain seconds/milliseconds in the file
//! and become typed [`EngineConfig`] values here.

use crate::env;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use valor_adapters::agent::ProcessEngineConfig;
use valor_adapters::classify::CommandClassifierConfig;
use valor_engine::{EngineConfig, WatchdogConfig};

/// Errors loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot determine state directory (no VALOR_STATE_DIR, XDG_STATE_HOME or HOME)")]
    NoStateDir,
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    agent: AgentSection,
    #[serde(default)]
    classifier: ClassifierSection,
    #[serde(default)]
    engine: EngineSection,
    #[serde(default)]
    watchdog: WatchdogSection,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AgentSection {
    command: String,
    #[serde(default)]
    args: Vec<String>,
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            command: "claude".to_string(),
            args: vec!["-p".to_string()],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ClassifierSection {
    command: String,
    #[serde(default)]
    args: Vec<String>,
    #[serde(default)]
    timeout_secs: Option<u64>,
}

impl Default for ClassifierSection {
    fn default() -> Self {
        Self {
            command: "valor-classify".to_string(),
            args: Vec::new(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct EngineSection {
    session_timeout_secs: Option<u64>,
    poll_interval_ms: Option<u64>,
    max_auto_continues: Option<u32>,
    workspace_root: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct WatchdogSection {
    sweep_interval_secs: Option<u64>,
    silence_threshold_secs: Option<u64>,
    error_cascade_limit: Option<u32>,
    runaway_duration_secs: Option<u64>,
}

/// Resolved daemon configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub state_dir: PathBuf,
    pub store_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub restart_flag_path: PathBuf,
    pub engine: EngineConfig,
    pub agent: ProcessEngineConfig,
    pub classifier: CommandClassifierConfig,
}

impl Config {
    /// Load from `<state_dir>/config.toml`, falling back to defaults when
    /// the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let state_dir = env::state_dir()?;
        let file = state_dir.join("config.toml");
        let parsed: ConfigFile = if file.exists() {
            toml::from_str(&std::fs::read_to_string(&file)?)?
        } else {
            ConfigFile::default()
        };
        Ok(Self::from_file(state_dir, parsed))
    }

    fn from_file(state_dir: PathBuf, file: ConfigFile) -> Self {
        let defaults = EngineConfig::default();
        let watchdog_defaults = WatchdogConfig::default();

        let watchdog = WatchdogConfig {
            sweep_interval: file
                .watchdog
                .sweep_interval_secs
                .map(Duration::from_secs)
                .unwrap_or(watchdog_defaults.sweep_interval),
            silence_threshold: file
                .watchdog
                .silence_threshold_secs
                .map(Duration::from_secs)
                .unwrap_or(watchdog_defaults.silence_threshold),
            error_cascade_limit: file
                .watchdog
                .error_cascade_limit
                .unwrap_or(watchdog_defaults.error_cascade_limit),
            runaway_duration: file
                .watchdog
                .runaway_duration_secs
                .map(Duration::from_secs)
                .unwrap_or(watchdog_defaults.runaway_duration),
        };

        let engine = EngineConfig {
            session_timeout: file
                .engine
                .session_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.session_timeout),
            poll_interval: file
                .engine
                .poll_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.poll_interval),
            max_auto_continues: file
                .engine
                .max_auto_continues
                .unwrap_or(defaults.max_auto_continues),
            workspace_root: file.engine.workspace_root,
            watchdog,
            ..defaults
        };

        let agent = ProcessEngineConfig {
            command: file.agent.command,
            args: file.agent.args,
            env: Vec::new(),
        };

        let mut classifier = CommandClassifierConfig::new(file.classifier.command);
        classifier.args = file.classifier.args;
        if let Some(secs) = file.classifier.timeout_secs {
            classifier.timeout = Duration::from_secs(secs);
        }

        Self {
            store_dir: state_dir.join("store"),
            logs_dir: state_dir.join("logs"),
            restart_flag_path: state_dir.join("restart.flag"),
            state_dir,
            engine,
            agent,
            classifier,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
