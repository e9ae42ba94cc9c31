// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake session engine for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{ActivityPing, EngineError, RawOutput, SessionEngine, SessionRequest};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Scripted behavior for one engine call.
#[derive(Debug, Clone)]
pub enum FakeRun {
    /// Return this output after emitting one liveness ping.
    Output(RawOutput),
    /// Fail with this engine error.
    Error(EngineError),
    /// Never return (for timeout tests).
    Hang,
}

struct FakeEngineState {
    script: VecDeque<FakeRun>,
    requests: Vec<SessionRequest>,
}

/// Fake session engine with a scripted run queue.
///
/// Each call consumes the next scripted run; an exhausted script returns
/// an empty completion.
#[derive(Clone)]
pub struct FakeSessionEngine {
    inner: Arc<Mutex<FakeEngineState>>,
}

impl Default for FakeSessionEngine {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeEngineState {
                script: VecDeque::new(),
                requests: Vec::new(),
            })),
        }
    }
}

impl FakeSessionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful run returning the given text.
    pub fn push_text(&self, text: impl Into<String>) {
        self.push(FakeRun::Output(RawOutput::text(text)));
    }

    /// Queue an engine-level failure.
    pub fn push_error(&self, error: EngineError) {
        self.push(FakeRun::Error(error));
    }

    /// Queue a run that never completes.
    pub fn push_hang(&self) {
        self.push(FakeRun::Hang);
    }

    pub fn push(&self, run: FakeRun) {
        self.inner.lock().script.push_back(run);
    }

    /// All requests seen so far.
    pub fn requests(&self) -> Vec<SessionRequest> {
        self.inner.lock().requests.clone()
    }
}

#[async_trait]
impl SessionEngine for FakeSessionEngine {
    async fn run(
        &self,
        request: SessionRequest,
        pings: mpsc::Sender<ActivityPing>,
    ) -> Result<RawOutput, EngineError> {
        let session_id = request.session_id.clone();
        let run = {
            let mut inner = self.inner.lock();
            inner.requests.push(request);
            inner.script.pop_front()
        };

        let _ = pings.send(ActivityPing { session_id }).await;

        match run {
            Some(FakeRun::Output(output)) => Ok(output),
            Some(FakeRun::Error(error)) => Err(error),
            Some(FakeRun::Hang) => {
                // Far beyond any test timeout
                tokio::time::sleep(Duration::from_secs(86_400)).await;
                Ok(RawOutput::text(""))
            }
            None => Ok(RawOutput::text("")),
        }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
