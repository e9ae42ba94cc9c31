// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session engine adapter.
//!
//! The engine runs one agent turn to completion: given a session identity,
//! a prompt and a working directory, it streams output and returns the
//! final text. Resuming with the same session identity preserves prior
//! conversational context, which is what auto-continuation relies on.
//!
//! Engine-level failures (spawn, crash, non-zero exit) are a different
//! thing from an agent *reporting* a problem in its output: the former
//! surface as `EngineError` and fail the job without classification.

mod process;

pub use process::{ProcessEngineConfig, ProcessSessionEngine};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeRun, FakeSessionEngine};

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::mpsc;
use valor_core::SessionId;

/// Errors from the session engine itself (not from the agent's work).
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error("spawn failed: {0}")]
    SpawnFailed(String),
    #[error("engine exited with {code:?}: {stderr}")]
    Exited { code: Option<i32>, stderr: String },
    #[error("engine call timed out after {secs}s")]
    Timeout { secs: u64 },
    #[error("engine io error: {0}")]
    Io(String),
}

/// One engine invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRequest {
    pub session_id: SessionId,
    pub prompt: String,
    pub working_dir: PathBuf,
    /// Resume the existing session instead of starting a fresh one.
    pub resume: bool,
}

/// What a successful engine call produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RawOutput {
    pub text: String,
    pub cost_usd: Option<f64>,
}

impl RawOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            cost_usd: None,
        }
    }
}

/// Liveness ping emitted while an engine call streams output.
///
/// The watchdog uses the absence of these to detect silent sessions.
#[derive(Debug, Clone)]
pub struct ActivityPing {
    pub session_id: SessionId,
}

/// Adapter for the LLM coding-agent runtime.
#[async_trait]
pub trait SessionEngine: Clone + Send + Sync + 'static {
    /// Run one agent turn to completion.
    ///
    /// `pings` receives a liveness signal per chunk of streamed output;
    /// the engine never writes to the chat transport itself.
    async fn run(
        &self,
        request: SessionRequest,
        pings: mpsc::Sender<ActivityPing>,
    ) -> Result<RawOutput, EngineError>;
}
