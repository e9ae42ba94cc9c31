// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess-backed classifier.
//!
//! The classification service is invoked as a command that reads a JSON
//! payload on stdin and prints a single classification JSON object:
//! `{"type": ..., "confidence": ..., "reason": ..., "coaching_message": ...}`.
//! Coaching text arrives in the same response as the classification, so the
//! two can never drift apart.

use super::{Classifier, ClassifyError};
use async_trait::async_trait;
use serde::Serialize;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use valor_core::ClassificationResult;

/// Default timeout for one classification call.
const CLASSIFY_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for the classifier subprocess.
#[derive(Debug, Clone)]
pub struct CommandClassifierConfig {
    pub command: String,
    pub args: Vec<String>,
    pub timeout: Duration,
}

impl CommandClassifierConfig {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            timeout: CLASSIFY_TIMEOUT,
        }
    }
}

#[derive(Serialize)]
struct ClassifyPayload<'a> {
    output: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<&'a str>,
}

/// Classifier that shells out to the classification service.
#[derive(Clone)]
pub struct CommandClassifier {
    config: Arc<CommandClassifierConfig>,
}

impl CommandClassifier {
    pub fn new(config: CommandClassifierConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

#[async_trait]
impl Classifier for CommandClassifier {
    async fn classify(
        &self,
        output: &str,
        context: Option<&str>,
    ) -> Result<ClassificationResult, ClassifyError> {
        let payload = serde_json::to_vec(&ClassifyPayload { output, context })
            .map_err(|e| ClassifyError::InvalidResponse(e.to_string()))?;

        let mut child = Command::new(&self.config.command)
            .args(&self.config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ClassifyError::Unavailable(e.to_string()))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(&payload)
                .await
                .map_err(|e| ClassifyError::Unavailable(e.to_string()))?;
        }

        let result = tokio::time::timeout(self.config.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                ClassifyError::Unavailable(format!(
                    "classification timed out after {}s",
                    self.config.timeout.as_secs()
                ))
            })?
            .map_err(|e| ClassifyError::Unavailable(e.to_string()))?;

        if !result.status.success() {
            return Err(ClassifyError::Unavailable(format!(
                "classifier exited with {:?}",
                result.status.code()
            )));
        }

        let stdout = String::from_utf8_lossy(&result.stdout);
        let trimmed = stdout.trim();
        serde_json::from_str(trimmed)
            .map_err(|e| ClassifyError::InvalidResponse(format!("{e}: {trimmed}")))
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
