// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job store events, durably logged before being applied.

use crate::delivery::DeliveryState;
use crate::job::{Job, JobId};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A mutation of the job store. The write-ahead log holds these; the
/// materialized state is a fold over them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JobEvent {
    /// A new job was accepted.
    Enqueued { job: Job },
    /// A worker claimed the job (pending → running).
    Started { id: JobId, at_ms: u64 },
    /// The job finished (running → completed).
    Completed { id: JobId, at_ms: u64 },
    /// The job failed (running → failed).
    Failed {
        id: JobId,
        error: String,
        at_ms: u64,
    },
    /// The delivery tracker recorded an outcome.
    DeliveryChanged { id: JobId, state: DeliveryState },
    /// An isolated workspace was assigned to the job.
    WorkspaceAssigned { id: JobId, path: PathBuf },
    /// A terminal job was pruned from the store.
    Pruned { id: JobId },
}

impl JobEvent {
    pub fn job_id(&self) -> &JobId {
        match self {
            JobEvent::Enqueued { job } => &job.id,
            JobEvent::Started { id, .. }
            | JobEvent::Completed { id, .. }
            | JobEvent::Failed { id, .. }
            | JobEvent::DeliveryChanged { id, .. }
            | JobEvent::WorkspaceAssigned { id, .. }
            | JobEvent::Pruned { id } => id,
        }
    }

    /// Terse one-line summary for logs.
    pub fn log_summary(&self) -> String {
        match self {
            JobEvent::Enqueued { job } => format!(
                "enqueued {} project={} session={} continue={}",
                job.id, job.project_key, job.session_id, job.auto_continue_count
            ),
            JobEvent::Started { id, .. } => format!("started {id}"),
            JobEvent::Completed { id, .. } => format!("completed {id}"),
            JobEvent::Failed { id, error, .. } => format!("failed {id}: {error}"),
            JobEvent::DeliveryChanged { id, state } => format!("delivery {id} -> {state}"),
            JobEvent::WorkspaceAssigned { id, path } => {
                format!("workspace {id} -> {}", path.display())
            }
            JobEvent::Pruned { id } => format!("pruned {id}"),
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
