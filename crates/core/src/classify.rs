// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Classification of agent output.
//!
//! One agent response is classified into one of five kinds with a
//! confidence score. Everything except `Status` is always shown to the
//! human; `Status` is eligible for bounded auto-continuation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classifications below this confidence resolve to [`OutputKind::Question`],
/// whatever the raw guess was. Uncertainty biases toward showing the human,
/// never toward silent continuation.
pub const CONFIDENCE_FLOOR: f64 = 0.80;

/// What an agent response amounts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    /// Task done, answer ready to deliver as-is.
    Completion,
    /// Requires a human decision; never auto-continued.
    Question,
    /// External obstacle (missing credentials, access).
    Blocker,
    /// Failure surfaced to the user.
    Error,
    /// Intermediate progress; eligible for auto-continuation.
    Status,
}

impl OutputKind {
    /// Every kind except `Status` is delivered to the user unconditionally.
    pub fn always_delivered(&self) -> bool {
        !matches!(self, OutputKind::Status)
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputKind::Completion => write!(f, "completion"),
            OutputKind::Question => write!(f, "question"),
            OutputKind::Blocker => write!(f, "blocker"),
            OutputKind::Error => write!(f, "error"),
            OutputKind::Status => write!(f, "status"),
        }
    }
}

/// Result of classifying one agent response.
///
/// This is also the wire format of the classification service
/// (`{"type": ..., "confidence": ..., "reason": ..., "coaching_message": ...}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    #[serde(rename = "type")]
    pub kind: OutputKind,
    pub confidence: f64,
    pub reason: String,
    /// Specific guidance for the next continuation prompt. Only ever
    /// populated on `Status` results; generated in the same pass as the
    /// classification so the two cannot drift apart.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coaching_message: Option<String>,
}

impl ClassificationResult {
    pub fn new(kind: OutputKind, confidence: f64, reason: impl Into<String>) -> Self {
        Self {
            kind,
            confidence,
            reason: reason.into(),
            coaching_message: None,
        }
    }

    pub fn with_coaching(mut self, message: impl Into<String>) -> Self {
        self.coaching_message = Some(message.into());
        self
    }

    /// Apply the safety policy to a raw classification.
    ///
    /// Below [`CONFIDENCE_FLOOR`] the result resolves to `Question`, and
    /// coaching text is stripped from anything that is not a `Status`.
    pub fn resolve(mut self) -> Self {
        if self.confidence < CONFIDENCE_FLOOR && self.kind != OutputKind::Question {
            self.reason = format!(
                "low confidence ({:.2}) in {}: {}",
                self.confidence, self.kind, self.reason
            );
            self.kind = OutputKind::Question;
        }
        if self.kind != OutputKind::Status {
            self.coaching_message = None;
        }
        self
    }
}

#[cfg(test)]
#[path = "classify_tests.rs"]
mod tests;
