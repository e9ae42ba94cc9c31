// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-session liveness and error-cascade tracking.
//!
//! The session runner writes into this; the watchdog reads it. It is the
//! only thing the watchdog knows about session health besides the store.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use valor_core::SessionId;

#[derive(Debug, Clone, Default)]
struct ActivityRecord {
    last_activity_ms: u64,
    consecutive_errors: u32,
}

/// Shared activity log. Cheap to clone.
#[derive(Clone, Default)]
pub struct ActivityLog {
    inner: Arc<Mutex<HashMap<SessionId, ActivityRecord>>>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a liveness signal (streamed output, call start).
    pub fn record_output(&self, session_id: &SessionId, at_ms: u64) {
        let mut inner = self.inner.lock();
        let record = inner.entry(session_id.clone()).or_default();
        record.last_activity_ms = record.last_activity_ms.max(at_ms);
    }

    /// Record a session-level error. Errors count consecutively until a
    /// success clears them.
    pub fn record_error(&self, session_id: &SessionId, at_ms: u64) {
        let mut inner = self.inner.lock();
        let record = inner.entry(session_id.clone()).or_default();
        record.last_activity_ms = record.last_activity_ms.max(at_ms);
        record.consecutive_errors += 1;
    }

    /// A successful run breaks the error cascade.
    pub fn clear_errors(&self, session_id: &SessionId) {
        if let Some(record) = self.inner.lock().get_mut(session_id) {
            record.consecutive_errors = 0;
        }
    }

    pub fn last_activity_ms(&self, session_id: &SessionId) -> Option<u64> {
        self.inner
            .lock()
            .get(session_id)
            .map(|r| r.last_activity_ms)
    }

    pub fn consecutive_errors(&self, session_id: &SessionId) -> u32 {
        self.inner
            .lock()
            .get(session_id)
            .map(|r| r.consecutive_errors)
            .unwrap_or(0)
    }

    /// Drop tracking for a finished session.
    pub fn forget(&self, session_id: &SessionId) {
        self.inner.lock().remove(session_id);
    }
}

#[cfg(test)]
#[path = "activity_tests.rs"]
mod tests;
