// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess-backed session engine.
//!
//! Spawns the configured agent CLI once per job, streaming stdout line by
//! line. Session identity maps onto the CLI's own session flags:
//! `--session-id <id>` for a fresh session, `--resume <id>` for a
//! continuation.

use super::{ActivityPing, EngineError, RawOutput, SessionEngine, SessionRequest};
use async_trait::async_trait;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::debug;

/// Configuration for the agent subprocess.
#[derive(Debug, Clone)]
pub struct ProcessEngineConfig {
    /// Binary to execute (e.g. `claude`).
    pub command: String,
    /// Arguments placed before the session flags.
    pub args: Vec<String>,
    /// Extra environment variables.
    pub env: Vec<(String, String)>,
}

impl ProcessEngineConfig {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }
}

/// Session engine that shells out to an agent CLI.
#[derive(Clone)]
pub struct ProcessSessionEngine {
    config: Arc<ProcessEngineConfig>,
}

impl ProcessSessionEngine {
    pub fn new(config: ProcessEngineConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

#[async_trait]
impl SessionEngine for ProcessSessionEngine {
    async fn run(
        &self,
        request: SessionRequest,
        pings: mpsc::Sender<ActivityPing>,
    ) -> Result<RawOutput, EngineError> {
        let mut cmd = Command::new(&self.config.command);
        cmd.args(&self.config.args);
        if request.resume {
            cmd.arg("--resume").arg(request.session_id.as_str());
        } else {
            cmd.arg("--session-id").arg(request.session_id.as_str());
        }
        cmd.arg(&request.prompt);
        cmd.current_dir(&request.working_dir);
        for (key, value) in &self.config.env {
            cmd.env(key, value);
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(
            session_id = %request.session_id,
            resume = request.resume,
            cwd = %request.working_dir.display(),
            "spawning agent session",
        );

        let mut child = cmd
            .spawn()
            .map_err(|e| EngineError::SpawnFailed(e.to_string()))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| EngineError::Io("no stdout handle".to_string()))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| EngineError::Io("no stderr handle".to_string()))?;

        let mut lines = BufReader::new(stdout).lines();
        let mut text = String::new();
        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| EngineError::Io(e.to_string()))?
        {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(&line);
            // Dropped receiver just means nobody is watching liveness
            let _ = pings
                .send(ActivityPing {
                    session_id: request.session_id.clone(),
                })
                .await;
        }

        let mut stderr_buf = String::new();
        let _ = stderr.read_to_string(&mut stderr_buf).await;

        let status = child
            .wait()
            .await
            .map_err(|e| EngineError::Io(e.to_string()))?;

        if !status.success() {
            return Err(EngineError::Exited {
                code: status.code(),
                stderr: tail(&stderr_buf, 2000),
            });
        }

        let (text, cost_usd) = split_cost_line(text);
        Ok(RawOutput { text, cost_usd })
    }
}

/// Keep at most the last `n` bytes of a string (on a char boundary).
fn tail(s: &str, n: usize) -> String {
    if s.len() <= n {
        return s.to_string();
    }
    let mut start = s.len() - n;
    while !s.is_char_boundary(start) {
        start += 1;
    }
    s[start..].to_string()
}

/// Some agent CLIs print a final JSON result line carrying a cost
/// estimate. Lift it out of the text when present.
fn split_cost_line(text: String) -> (String, Option<f64>) {
    let Some(last) = text.lines().last() else {
        return (text, None);
    };
    let trimmed = last.trim();
    if !trimmed.starts_with('{') {
        return (text, None);
    }
    let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) else {
        return (text, None);
    };
    let Some(cost) = value.get("total_cost_usd").and_then(|v| v.as_f64()) else {
        return (text, None);
    };
    let stripped = text
        .lines()
        .take(text.lines().count().saturating_sub(1))
        .collect::<Vec<_>>()
        .join("\n");
    (stripped, Some(cost))
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
