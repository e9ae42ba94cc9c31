// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cooperative restart signal.
//!
//! Readable by every worker, settable in-process or by an external
//! updater touching a flag file. Consumed only between job executions;
//! a running session is never interrupted by it.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct RestartSignal {
    flag: Arc<AtomicBool>,
    flag_file: Option<Arc<PathBuf>>,
}

impl RestartSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also honor the existence of a flag file, so an updater process can
    /// request a restart without talking to the daemon.
    pub fn with_flag_file(path: impl Into<PathBuf>) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            flag_file: Some(Arc::new(path.into())),
        }
    }

    pub fn request(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        if self.flag.load(Ordering::SeqCst) {
            return true;
        }
        self.flag_file.as_deref().is_some_and(|p| p.exists())
    }

    /// Clear both the in-process flag and the flag file.
    pub fn clear(&self) {
        self.flag.store(false, Ordering::SeqCst);
        if let Some(path) = self.flag_file.as_deref() {
            let _ = std::fs::remove_file(path);
        }
    }
}

#[cfg(test)]
#[path = "restart_tests.rs"]
mod tests;
