// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output classification adapters.
//!
//! The primary classifier is an external service (an LLM behind a CLI);
//! when it is unreachable the worker falls back to the pattern-based
//! [`HeuristicClassifier`]. Both bias toward `question` when unsure —
//! uncertainty must show the human, never silently continue.

mod command;
mod heuristic;

pub use command::{CommandClassifier, CommandClassifierConfig};
pub use heuristic::HeuristicClassifier;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeClassifier;

use async_trait::async_trait;
use thiserror::Error;
use valor_core::ClassificationResult;

/// Errors from classification
#[derive(Debug, Clone, Error)]
pub enum ClassifyError {
    /// The classification service could not be reached or did not answer.
    #[error("classifier unavailable: {0}")]
    Unavailable(String),
    /// The service answered with something that isn't a classification.
    #[error("invalid classification response: {0}")]
    InvalidResponse(String),
}

/// Classifies one agent response.
#[async_trait]
pub trait Classifier: Clone + Send + Sync + 'static {
    /// Classify `output`, optionally with active plan/skill context.
    ///
    /// Implementations return the raw result; the caller applies
    /// [`ClassificationResult::resolve`] for the confidence-floor policy.
    async fn classify(
        &self,
        output: &str,
        context: Option<&str>,
    ) -> Result<ClassificationResult, ClassifyError>;
}
