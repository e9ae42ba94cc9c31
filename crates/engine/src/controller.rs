// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Continuation controller.
//!
//! Decides, from a resolved classification, whether a job's output is
//! delivered or whether the session keeps working unattended. Continuation
//! is modeled strictly as a new job with session resumption — by the time
//! classification runs the session has already finished, so there is no
//! live channel to push anything into.

use tracing::info;
use valor_core::{ClassificationResult, Job, JobConfig, OutputKind};

/// What to do with a finished job's output.
#[derive(Debug, Clone, PartialEq)]
pub enum Disposition {
    /// Hand the output to the delivery tracker.
    Finalize {
        /// The continuation budget ran out on a `status` result; deliver
        /// what exists with an exhaustion note instead of looping.
        exhausted: bool,
    },
    /// Don't deliver; enqueue this follow-up job instead.
    Continue { next: JobConfig },
}

/// Applies the bounded auto-continuation policy.
#[derive(Debug, Clone)]
pub struct ContinuationController {
    max_auto_continues: u32,
}

impl ContinuationController {
    pub fn new(max_auto_continues: u32) -> Self {
        Self { max_auto_continues }
    }

    /// Decide for one (job, classification) pair.
    ///
    /// Everything except `status` is always delivered. A `status` under
    /// the cap re-enqueues with the same session identity and the
    /// coaching message as the next prompt.
    pub fn decide(&self, job: &Job, classification: &ClassificationResult) -> Disposition {
        if classification.kind != OutputKind::Status {
            return Disposition::Finalize { exhausted: false };
        }

        if job.auto_continue_count >= self.max_auto_continues {
            info!(
                job_id = %job.id,
                session_id = %job.session_id,
                count = job.auto_continue_count,
                "auto-continuation budget exhausted, force-finalizing as completion",
            );
            return Disposition::Finalize { exhausted: true };
        }

        let next = job.continuation(classification.coaching_message.as_deref());
        info!(
            job_id = %job.id,
            session_id = %job.session_id,
            next_count = next.auto_continue_count,
            coached = classification.coaching_message.is_some(),
            "status output, auto-continuing",
        );
        Disposition::Continue { next }
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
