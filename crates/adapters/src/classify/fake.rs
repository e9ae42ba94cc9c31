// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake classifier for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{Classifier, ClassifyError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use valor_core::{ClassificationResult, OutputKind};

struct FakeClassifierState {
    script: VecDeque<Result<ClassificationResult, ClassifyError>>,
    seen: Vec<String>,
}

/// Classifier with a scripted result queue.
///
/// An exhausted script returns a confident completion.
#[derive(Clone)]
pub struct FakeClassifier {
    inner: Arc<Mutex<FakeClassifierState>>,
}

impl Default for FakeClassifier {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeClassifierState {
                script: VecDeque::new(),
                seen: Vec::new(),
            })),
        }
    }
}

impl FakeClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, result: ClassificationResult) {
        self.inner.lock().script.push_back(Ok(result));
    }

    pub fn push_error(&self, error: ClassifyError) {
        self.inner.lock().script.push_back(Err(error));
    }

    /// Queue a confident status result with coaching.
    pub fn push_status(&self, coaching: &str) {
        self.push(
            ClassificationResult::new(OutputKind::Status, 0.9, "mid-task update")
                .with_coaching(coaching),
        );
    }

    /// Queue a confident result of the given kind.
    pub fn push_kind(&self, kind: OutputKind) {
        self.push(ClassificationResult::new(kind, 0.95, "scripted"));
    }

    /// Outputs passed to `classify` so far.
    pub fn seen(&self) -> Vec<String> {
        self.inner.lock().seen.clone()
    }
}

#[async_trait]
impl Classifier for FakeClassifier {
    async fn classify(
        &self,
        output: &str,
        _context: Option<&str>,
    ) -> Result<ClassificationResult, ClassifyError> {
        let mut inner = self.inner.lock();
        inner.seen.push(output.to_string());
        inner.script.pop_front().unwrap_or_else(|| {
            Ok(ClassificationResult::new(
                OutputKind::Completion,
                0.95,
                "default scripted completion",
            ))
        })
    }
}
