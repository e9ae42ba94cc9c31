// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The job store: materialized state plus the WAL behind one lock.
//!
//! All public operations take the store lock, append the mutation to the
//! WAL (durability point), then apply it to the in-memory state. One lock
//! means `pop_next` is a single-writer transition: two workers can never
//! both claim the same job.

use crate::snapshot::Snapshot;
use crate::wal::{Wal, WalError};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use valor_core::{
    Clock, DeliveryState, IdGen, Job, JobConfig, JobEvent, JobId, JobStatus, SessionId,
};

/// Errors from job store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// The storage backend could not be reached or written. Callers must
    /// not drop work on this; the worker loop retries with backoff.
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("job not found: {0}")]
    NotFound(JobId),
    #[error("invalid transition for {id}: {from} -> {to}")]
    InvalidTransition {
        id: JobId,
        from: JobStatus,
        to: JobStatus,
    },
}

impl From<WalError> for StoreError {
    fn from(e: WalError) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

impl From<crate::snapshot::SnapshotError> for StoreError {
    fn from(e: crate::snapshot::SnapshotError) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

/// Materialized job state: a fold over [`JobEvent`]s.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreState {
    jobs: BTreeMap<String, Job>,
}

impl StoreState {
    /// Apply an event. Replay-tolerant: events for unknown jobs are
    /// ignored rather than erroring, since a pruned job may still have
    /// trailing WAL entries.
    pub fn apply(&mut self, event: &JobEvent) {
        match event {
            JobEvent::Enqueued { job } => {
                self.jobs.insert(job.id.as_str().to_string(), job.clone());
            }
            JobEvent::Started { id, at_ms } => {
                if let Some(job) = self.jobs.get_mut(id.as_str()) {
                    job.status = JobStatus::Running;
                    job.started_at_ms = Some(*at_ms);
                    job.delivery = DeliveryState::Processing;
                }
            }
            JobEvent::Completed { id, at_ms } => {
                if let Some(job) = self.jobs.get_mut(id.as_str()) {
                    job.status = JobStatus::Completed;
                    job.finished_at_ms = Some(*at_ms);
                }
            }
            JobEvent::Failed { id, error, at_ms } => {
                if let Some(job) = self.jobs.get_mut(id.as_str()) {
                    job.status = JobStatus::Failed;
                    job.error = Some(error.clone());
                    job.finished_at_ms = Some(*at_ms);
                }
            }
            JobEvent::DeliveryChanged { id, state } => {
                if let Some(job) = self.jobs.get_mut(id.as_str()) {
                    job.delivery = *state;
                }
            }
            JobEvent::WorkspaceAssigned { id, path } => {
                if let Some(job) = self.jobs.get_mut(id.as_str()) {
                    job.worktree_dir = Some(path.clone());
                }
            }
            JobEvent::Pruned { id } => {
                self.jobs.remove(id.as_str());
            }
        }
    }

    pub fn get(&self, id: &JobId) -> Option<&Job> {
        self.jobs.get(id.as_str())
    }

    pub fn jobs(&self) -> impl Iterator<Item = &Job> {
        self.jobs.values()
    }

    pub fn running_count(&self) -> usize {
        self.jobs
            .values()
            .filter(|j| j.status == JobStatus::Running)
            .count()
    }

    /// The next pending job for a project: highest priority first, ties
    /// broken by earliest creation, then by id for determinism.
    fn next_pending(&self, project_key: &str) -> Option<&Job> {
        self.jobs
            .values()
            .filter(|j| j.project_key == project_key && j.status == JobStatus::Pending)
            .min_by_key(|j| (std::cmp::Reverse(j.priority), j.created_at_ms, j.id.clone()))
    }

    fn project_has_running(&self, project_key: &str) -> bool {
        self.jobs
            .values()
            .any(|j| j.project_key == project_key && j.status == JobStatus::Running)
    }

    /// Whether the session chain already spent its single revival.
    fn session_has_revival(&self, session_id: &SessionId) -> bool {
        self.jobs
            .values()
            .any(|j| &j.session_id == session_id && j.revival_context.is_some())
    }
}

/// What crash recovery did.
#[derive(Debug, Default)]
pub struct RecoveryReport {
    /// (stale job, revival job) pairs that were re-enqueued.
    pub revived: Vec<(JobId, JobId)>,
    /// Stale jobs failed outright (revival already spent).
    pub failed: Vec<JobId>,
}

impl RecoveryReport {
    pub fn is_empty(&self) -> bool {
        self.revived.is_empty() && self.failed.is_empty()
    }
}

struct StoreInner {
    state: StoreState,
    wal: Wal,
}

/// Durable, crash-safe job store.
///
/// Cheap to clone; clones share the same state and WAL.
pub struct JobStore<C: Clock, G: IdGen> {
    inner: Arc<Mutex<StoreInner>>,
    snapshot_path: PathBuf,
    clock: C,
    ids: G,
}

impl<C: Clock, G: IdGen> Clone for JobStore<C, G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            snapshot_path: self.snapshot_path.clone(),
            clock: self.clock.clone(),
            ids: self.ids.clone(),
        }
    }
}

impl<C: Clock, G: IdGen> JobStore<C, G> {
    /// Open the store in `dir`, loading the snapshot (if any) and
    /// replaying the WAL tail.
    pub fn open(dir: &Path, clock: C, ids: G) -> Result<Self, StoreError> {
        // Distinct stems: corrupt-file rotation renames to `<stem>.bak`,
        // so the journal and the snapshot must never share one.
        let wal_path = dir.join("journal.wal");
        let snapshot_path = dir.join("state.snapshot");

        let snapshot = Snapshot::load(&snapshot_path)?;
        let (mut state, snapshot_seq) = match snapshot {
            Some(s) => (s.state, s.seq),
            None => (StoreState::default(), 0),
        };

        let wal = Wal::open(&wal_path)?;
        let tail = wal.entries_after(snapshot_seq)?;
        let replayed = tail.len();
        for entry in tail {
            state.apply(&entry.event);
        }

        if replayed > 0 {
            info!(replayed, snapshot_seq, "job store recovered from WAL tail");
        }

        Ok(Self {
            inner: Arc::new(Mutex::new(StoreInner { state, wal })),
            snapshot_path,
            clock,
            ids,
        })
    }

    fn commit(inner: &mut StoreInner, event: JobEvent) -> Result<(), StoreError> {
        inner.wal.append(&event)?;
        debug!(event = %event.log_summary(), "job event");
        inner.state.apply(&event);
        Ok(())
    }

    /// Next id not already present in the state. Sequential generators
    /// restart after a reopen; an existing record must never be
    /// overwritten by a colliding enqueue.
    fn fresh_id(state: &StoreState, ids: &G) -> JobId {
        loop {
            let id = JobId::new(ids.next());
            if state.get(&id).is_none() {
                return id;
            }
        }
    }

    /// Accept a new job. Returns its assigned id once the enqueue is
    /// durable.
    pub fn enqueue(&self, config: JobConfig) -> Result<JobId, StoreError> {
        let mut inner = self.inner.lock();
        let id = Self::fresh_id(&inner.state, &self.ids);
        let job = Job::new(id.clone(), config, self.clock.epoch_ms());
        Self::commit(&mut inner, JobEvent::Enqueued { job })?;
        Ok(id)
    }

    /// Atomically claim the next pending job for a project.
    ///
    /// Returns `None` when the project queue is empty, or when a job is
    /// already running for this project (sequential-per-project
    /// guarantee).
    pub fn pop_next(&self, project_key: &str) -> Result<Option<Job>, StoreError> {
        let mut inner = self.inner.lock();

        if inner.state.project_has_running(project_key) {
            return Ok(None);
        }

        let Some(id) = inner.state.next_pending(project_key).map(|j| j.id.clone()) else {
            return Ok(None);
        };

        Self::commit(
            &mut inner,
            JobEvent::Started {
                id: id.clone(),
                at_ms: self.clock.epoch_ms(),
            },
        )?;

        Ok(inner.state.get(&id).cloned())
    }

    pub fn mark_completed(&self, id: &JobId) -> Result<(), StoreError> {
        self.mark_terminal(id, JobStatus::Completed, None)
    }

    pub fn mark_failed(&self, id: &JobId, error: impl Into<String>) -> Result<(), StoreError> {
        self.mark_terminal(id, JobStatus::Failed, Some(error.into()))
    }

    fn mark_terminal(
        &self,
        id: &JobId,
        to: JobStatus,
        error: Option<String>,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        let job = inner
            .state
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        if !job.status.can_advance_to(to) {
            return Err(StoreError::InvalidTransition {
                id: id.clone(),
                from: job.status,
                to,
            });
        }

        let at_ms = self.clock.epoch_ms();
        let event = match to {
            JobStatus::Failed => JobEvent::Failed {
                id: id.clone(),
                error: error.unwrap_or_else(|| "unspecified failure".to_string()),
                at_ms,
            },
            _ => JobEvent::Completed {
                id: id.clone(),
                at_ms,
            },
        };
        Self::commit(&mut inner, event)
    }

    /// Record the delivery outcome chosen by the tracker.
    pub fn set_delivery(&self, id: &JobId, state: DeliveryState) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        if inner.state.get(id).is_none() {
            return Err(StoreError::NotFound(id.clone()));
        }
        Self::commit(
            &mut inner,
            JobEvent::DeliveryChanged {
                id: id.clone(),
                state,
            },
        )
    }

    /// Record the isolated workspace assigned to a job.
    pub fn set_worktree(&self, id: &JobId, path: PathBuf) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        if inner.state.get(id).is_none() {
            return Err(StoreError::NotFound(id.clone()));
        }
        Self::commit(
            &mut inner,
            JobEvent::WorkspaceAssigned {
                id: id.clone(),
                path,
            },
        )
    }

    pub fn get(&self, id: &JobId) -> Result<Job, StoreError> {
        self.inner
            .lock()
            .state
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    /// Jobs for a project in the given status, in pop order.
    pub fn query(&self, project_key: &str, status: JobStatus) -> Vec<Job> {
        let inner = self.inner.lock();
        let mut jobs: Vec<Job> = inner
            .state
            .jobs()
            .filter(|j| j.project_key == project_key && j.status == status)
            .cloned()
            .collect();
        jobs.sort_by_key(|j| (std::cmp::Reverse(j.priority), j.created_at_ms, j.id.clone()));
        jobs
    }

    /// Distinct project keys with any non-terminal job.
    pub fn active_projects(&self) -> Vec<String> {
        let inner = self.inner.lock();
        let mut projects: Vec<String> = inner
            .state
            .jobs()
            .filter(|j| !j.is_terminal())
            .map(|j| j.project_key.clone())
            .collect();
        projects.sort();
        projects.dedup();
        projects
    }

    /// Number of running jobs across all projects.
    pub fn running_count(&self) -> usize {
        self.inner.lock().state.running_count()
    }

    /// All running jobs across all projects (watchdog sweep input).
    pub fn running_jobs(&self) -> Vec<Job> {
        self.inner
            .lock()
            .state
            .jobs()
            .filter(|j| j.status == JobStatus::Running)
            .cloned()
            .collect()
    }

    /// Remove terminal jobs older than `older_than` that match the
    /// predicate. Returns the pruned ids.
    pub fn prune_stale(
        &self,
        older_than: Duration,
        predicate: impl Fn(&Job) -> bool,
    ) -> Result<Vec<JobId>, StoreError> {
        let cutoff = self
            .clock
            .epoch_ms()
            .saturating_sub(older_than.as_millis() as u64);

        let mut inner = self.inner.lock();
        let stale: Vec<JobId> = inner
            .state
            .jobs()
            .filter(|j| j.is_terminal())
            .filter(|j| j.finished_at_ms.unwrap_or(j.created_at_ms) < cutoff)
            .filter(|j| predicate(j))
            .map(|j| j.id.clone())
            .collect();

        for id in &stale {
            Self::commit(&mut inner, JobEvent::Pruned { id: id.clone() })?;
        }
        Ok(stale)
    }

    /// Fail a running job and re-enqueue it as a fresh pending job
    /// carrying `revival_context` — unless the session chain already
    /// spent its single revival, in which case the job is failed outright
    /// and `None` is returned.
    ///
    /// Shared by crash recovery and the watchdog, so the two mechanisms
    /// draw on the same one-revival budget.
    pub fn fail_and_revive(
        &self,
        id: &JobId,
        reason: &str,
    ) -> Result<Option<JobId>, StoreError> {
        let mut inner = self.inner.lock();
        let job = inner
            .state
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        if job.status != JobStatus::Running {
            return Err(StoreError::InvalidTransition {
                id: id.clone(),
                from: job.status,
                to: JobStatus::Failed,
            });
        }

        Self::revive_locked(&mut inner, &job, reason, &self.ids, self.clock.epoch_ms())
    }

    fn revive_locked(
        inner: &mut StoreInner,
        job: &Job,
        reason: &str,
        ids: &G,
        at_ms: u64,
    ) -> Result<Option<JobId>, StoreError> {
        let already_revived = inner.state.session_has_revival(&job.session_id);

        Self::commit(
            inner,
            JobEvent::Failed {
                id: job.id.clone(),
                error: reason.to_string(),
                at_ms,
            },
        )?;

        if already_revived {
            warn!(
                job_id = %job.id,
                session_id = %job.session_id,
                reason,
                "session already revived once, giving up",
            );
            return Ok(None);
        }

        // A revival retries the same exchange with the same prompt; it is
        // not a continuation, so the counter stays put.
        let mut config = job.continuation(Some(job.message_text.as_str()));
        config.auto_continue_count = job.auto_continue_count;
        config.revival_context = Some(format!("{reason} (job {})", job.id));

        let new_id = Self::fresh_id(&inner.state, ids);
        let revived = Job::new(new_id.clone(), config, at_ms);
        Self::commit(inner, JobEvent::Enqueued { job: revived })?;

        info!(stale = %job.id, revived = %new_id, reason, "re-enqueued job");
        Ok(Some(new_id))
    }

    /// Crash recovery: fail jobs left `running` by a dead process and
    /// revive each once via [`Self::fail_and_revive`] semantics.
    ///
    /// Idempotent: a second pass finds no stale running jobs.
    pub fn recover(&self, live: impl Fn(&Job) -> bool) -> Result<RecoveryReport, StoreError> {
        let mut inner = self.inner.lock();
        let stale: Vec<Job> = inner
            .state
            .jobs()
            .filter(|j| j.status == JobStatus::Running)
            .filter(|j| !live(j))
            .cloned()
            .collect();

        let mut report = RecoveryReport::default();
        let at_ms = self.clock.epoch_ms();

        for job in stale {
            match Self::revive_locked(
                &mut inner,
                &job,
                "worker lost (process restart)",
                &self.ids,
                at_ms,
            )? {
                Some(new_id) => report.revived.push((job.id, new_id)),
                None => report.failed.push(job.id),
            }
        }

        Ok(report)
    }

    /// Snapshot the current state and drop the covered WAL prefix.
    pub fn checkpoint(&self) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        let seq = inner.wal.write_seq();
        Snapshot::new(seq, inner.state.clone()).save(&self.snapshot_path)?;
        inner.wal.truncate_through(seq)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
