// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine configuration.
//!
//! One explicit config object, passed into constructors. There is no
//! module-level registry of projects or workers; tests build as many
//! independent instances as they like.

use std::path::PathBuf;
use std::time::Duration;
use valor_core::MAX_AUTO_CONTINUES;

/// Configuration shared by the worker loops and the session runner.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Hard timeout for one engine call.
    pub session_timeout: Duration,
    /// How often an idle worker re-checks its queue.
    pub poll_interval: Duration,
    /// Backoff bounds for store unavailability.
    pub store_backoff_initial: Duration,
    pub store_backoff_max: Duration,
    /// Cap on automatic continuations per session chain.
    pub max_auto_continues: u32,
    /// When set, each job runs in its own workspace directory under this
    /// root instead of mutating the shared working tree.
    pub workspace_root: Option<PathBuf>,
    pub watchdog: WatchdogConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            session_timeout: Duration::from_secs(30 * 60),
            poll_interval: Duration::from_millis(500),
            store_backoff_initial: Duration::from_secs(1),
            store_backoff_max: Duration::from_secs(60),
            max_auto_continues: MAX_AUTO_CONTINUES,
            workspace_root: None,
            watchdog: WatchdogConfig::default(),
        }
    }
}

/// Watchdog thresholds.
///
/// Deliberately configuration rather than constants: the right values
/// depend on the deployment (agent speed, project size), so operators
/// tune them per install.
#[derive(Debug, Clone)]
pub struct WatchdogConfig {
    /// How often the watchdog sweeps.
    pub sweep_interval: Duration,
    /// No liveness signal for this long counts as a silent session.
    pub silence_threshold: Duration,
    /// This many consecutive session errors counts as a cascade.
    pub error_cascade_limit: u32,
    /// A job running longer than this counts as a runaway.
    pub runaway_duration: Duration,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(30),
            silence_threshold: Duration::from_secs(120),
            error_cascade_limit: 3,
            runaway_duration: Duration::from_secs(30 * 60),
        }
    }
}
