// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pattern-based fallback classifier.
//!
//! Used when the classification service is unavailable. No LLM involved:
//! ordered pattern groups map agent output onto the five kinds, checked
//! most-conservative first so that an approval gate or a question can
//! never be mistaken for harmless progress. Anything inconclusive is a
//! `question` — the fallback must never default to `status`.

use super::{Classifier, ClassifyError};
use async_trait::async_trait;
use regex::{Regex, RegexBuilder};
use std::sync::Arc;
use valor_core::{ClassificationResult, OutputKind};

struct PatternGroup {
    kind: OutputKind,
    confidence: f64,
    reason: &'static str,
    patterns: Vec<Regex>,
}

fn build(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|p| RegexBuilder::new(p).case_insensitive(true).build().ok())
        .collect()
}

/// Conservative pattern classifier; see module docs.
#[derive(Clone)]
pub struct HeuristicClassifier {
    groups: Arc<Vec<PatternGroup>>,
}

impl Default for HeuristicClassifier {
    fn default() -> Self {
        let groups = vec![
            // Human decisions first: a question or approval gate outranks
            // everything else the text might also look like.
            PatternGroup {
                kind: OutputKind::Question,
                confidence: 0.85,
                reason: "asks for a decision or approval",
                patterns: build(&[
                    r"\?\s*$",
                    r"\?\s*\n",
                    r"\bshould i\b",
                    r"\bdo you want\b",
                    r"\bwould you (like|prefer)\b",
                    r"\bwhich (one|option|approach|of these)\b",
                    r"\blet me know\b",
                    r"\b(when|once|if)\b[^.\n]*\bapproved?\b",
                    r"\bawaiting\b[^.\n]*\b(approval|confirmation|go-ahead|input)\b",
                    r"\bwaiting (for|on)\b[^.\n]*\b(you|approval|confirmation)\b",
                    r"\bready to\b[^.\n]*\b(when|once|if)\b",
                ]),
            },
            PatternGroup {
                kind: OutputKind::Blocker,
                confidence: 0.85,
                reason: "blocked on something external",
                patterns: build(&[
                    r"\bmissing\b[^.\n]*\b(credential|token|api key|secret)s?\b",
                    r"\b(access|permission) denied\b",
                    r"\bneeds? access to\b",
                    r"\bcannot (reach|access|connect)\b",
                    r"\bunauthorized\b",
                    r"\bnot logged in\b",
                    r"\brate.?limit(ed)?\b",
                ]),
            },
            PatternGroup {
                kind: OutputKind::Error,
                confidence: 0.82,
                reason: "reports a failure",
                patterns: build(&[
                    r"\berror:\s",
                    r"\bfatal\b",
                    r"\bpanicked at\b",
                    r"\bexception\b",
                    r"\b(build|tests?|command|deploy(ment)?) failed\b",
                    r"\bfailed with\b",
                    r"\bcould not complete\b",
                ]),
            },
            PatternGroup {
                kind: OutputKind::Completion,
                confidence: 0.82,
                reason: "states a finished result",
                patterns: build(&[
                    r"\ball tests pass(ed)?\b",
                    r"\b(done|completed|finished)[.!]",
                    r"\b(deployed|merged|pushed|committed)\b[^?\n]*[.!]",
                    r"\bis now (live|working|fixed)\b",
                ]),
            },
            // Progress markers last: only unambiguous in-flight language
            // may continue unattended.
            PatternGroup {
                kind: OutputKind::Status,
                confidence: 0.81,
                reason: "describes work still in progress",
                patterns: build(&[
                    r"\bworking on\b",
                    r"\bin progress\b",
                    r"\bso far\b",
                    r"\bnext,? i('ll| will| am)\b",
                    r"\bcontinuing (to|with)\b",
                    r"\bstill (working|running|investigating)\b",
                    r"\bcurrently\b[^.\n]*\b(running|writing|building|testing)\b",
                ]),
            },
        ];

        Self {
            groups: Arc::new(groups),
        }
    }
}

impl HeuristicClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    fn classify_text(&self, output: &str) -> ClassificationResult {
        for group in self.groups.iter() {
            let Some(matched) = group
                .patterns
                .iter()
                .find_map(|p| p.find(output).map(|m| m.as_str()))
            else {
                continue;
            };

            let mut result = ClassificationResult::new(
                group.kind,
                group.confidence,
                format!("{} (matched {:?})", group.reason, matched),
            );
            if group.kind == OutputKind::Status {
                result = result.with_coaching(format!(
                    "the last update still reads as in-progress ({matched:?}); \
                     finish the task and state the concrete outcome with evidence",
                ));
            }
            return result;
        }

        // Inconclusive: below the confidence floor on purpose, so the
        // resolve step lands on question either way.
        ClassificationResult::new(
            OutputKind::Question,
            0.5,
            "no conclusive pattern; deferring to a human",
        )
    }
}

#[async_trait]
impl Classifier for HeuristicClassifier {
    async fn classify(
        &self,
        output: &str,
        _context: Option<&str>,
    ) -> Result<ClassificationResult, ClassifyError> {
        Ok(self.classify_text(output))
    }
}

#[cfg(test)]
#[path = "heuristic_tests.rs"]
mod tests;
