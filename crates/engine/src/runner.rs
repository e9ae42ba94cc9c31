// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session runner: one engine call per job, with a hard timeout.
//!
//! Engine-level failures (spawn, crash, timeout) come back as `Err` and
//! are never routed through the classifier; the caller fails the job and
//! delivers an error. Liveness pings from the engine are drained into the
//! shared [`ActivityLog`] for the watchdog.

use crate::activity::ActivityLog;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;
use valor_adapters::agent::{ActivityPing, EngineError, RawOutput, SessionEngine, SessionRequest};
use valor_core::{Clock, Job};

pub struct SessionRunner<E: SessionEngine, C: Clock> {
    engine: E,
    activity: ActivityLog,
    clock: C,
    timeout: Duration,
}

impl<E: SessionEngine, C: Clock> SessionRunner<E, C> {
    pub fn new(engine: E, activity: ActivityLog, clock: C, timeout: Duration) -> Self {
        Self {
            engine,
            activity,
            clock,
            timeout,
        }
    }

    /// Run the job's prompt through the engine.
    ///
    /// Continuation and revival jobs resume the existing session so prior
    /// conversational context carries over.
    pub async fn run(&self, job: &Job) -> Result<RawOutput, EngineError> {
        let request = SessionRequest {
            session_id: job.session_id.clone(),
            prompt: job.message_text.clone(),
            working_dir: job
                .worktree_dir
                .clone()
                .unwrap_or_else(|| job.working_dir.clone()),
            resume: job.resumes_session(),
        };

        debug!(
            job_id = %job.id,
            session_id = %job.session_id,
            resume = request.resume,
            "running agent session",
        );

        self.activity
            .record_output(&job.session_id, self.clock.epoch_ms());

        let (tx, mut rx) = mpsc::channel::<ActivityPing>(64);
        let activity = self.activity.clone();
        let clock = self.clock.clone();
        let drain = tokio::spawn(async move {
            while let Some(ping) = rx.recv().await {
                activity.record_output(&ping.session_id, clock.epoch_ms());
            }
        });

        let result = tokio::time::timeout(self.timeout, self.engine.run(request, tx)).await;

        // The engine future (and its ping sender) is gone by now, so the
        // drain task terminates on its own.
        let _ = drain.await;

        let outcome = match result {
            Ok(Ok(raw)) => {
                self.activity.clear_errors(&job.session_id);
                Ok(raw)
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(EngineError::Timeout {
                secs: self.timeout.as_secs(),
            }),
        };

        if outcome.is_err() {
            self.activity
                .record_error(&job.session_id, self.clock.epoch_ms());
        }

        outcome
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
