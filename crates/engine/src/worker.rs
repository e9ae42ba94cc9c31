// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-project worker loop.
//!
//! One loop instance per project key. Jobs within a project execute
//! strictly sequentially (the store refuses to hand out a second running
//! job); different projects are independent. The loop blocks only while
//! its queue is empty or an engine call is in flight, and it polls the
//! restart signal only between jobs — never preempting one.

use crate::activity::ActivityLog;
use crate::config::EngineConfig;
use crate::controller::{ContinuationController, Disposition};
use crate::delivery::DeliveryTracker;
use crate::restart::RestartSignal;
use crate::runner::SessionRunner;
use crate::workspace::WorkspaceArena;
use crate::RuntimeError;
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::{error, info, warn};
use valor_adapters::agent::SessionEngine;
use valor_adapters::classify::{Classifier, HeuristicClassifier};
use valor_adapters::transport::ChatTransport;
use valor_core::{Clock, IdGen, Job, OutputKind};
use valor_storage::{JobStore, StoreError};

/// Why the loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerExit {
    /// The restart signal was honored (no job running anywhere).
    RestartRequested,
    /// Shutdown was requested.
    Shutdown,
}

/// Worker loop for one project.
pub struct WorkerLoop<E, K, T, C, G>
where
    E: SessionEngine,
    K: Classifier,
    T: ChatTransport,
    C: Clock,
    G: IdGen,
{
    project_key: String,
    store: JobStore<C, G>,
    runner: SessionRunner<E, C>,
    classifier: K,
    /// Pattern fallback for when the classification service is down.
    heuristic: HeuristicClassifier,
    controller: ContinuationController,
    tracker: DeliveryTracker<T>,
    arena: WorkspaceArena,
    restart: RestartSignal,
    config: EngineConfig,
}

impl<E, K, T, C, G> WorkerLoop<E, K, T, C, G>
where
    E: SessionEngine,
    K: Classifier,
    T: ChatTransport,
    C: Clock,
    G: IdGen,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        project_key: impl Into<String>,
        store: JobStore<C, G>,
        engine: E,
        classifier: K,
        transport: T,
        activity: ActivityLog,
        clock: C,
        restart: RestartSignal,
        config: EngineConfig,
    ) -> Self {
        let arena = match &config.workspace_root {
            Some(root) => WorkspaceArena::rooted(root),
            None => WorkspaceArena::disabled(),
        };
        Self {
            project_key: project_key.into(),
            runner: SessionRunner::new(engine, activity, clock, config.session_timeout),
            classifier,
            heuristic: HeuristicClassifier::new(),
            controller: ContinuationController::new(config.max_auto_continues),
            tracker: DeliveryTracker::new(transport),
            arena,
            restart,
            store,
            config,
        }
    }

    /// Run until shutdown or an honored restart request.
    pub async fn run(&self, shutdown: Arc<Notify>) -> WorkerExit {
        let mut backoff = self.config.store_backoff_initial;
        info!(project = %self.project_key, "worker loop started");

        loop {
            match self.store.pop_next(&self.project_key) {
                Ok(Some(job)) => {
                    backoff = self.config.store_backoff_initial;
                    if let Err(e) = self.run_one(job).await {
                        error!(project = %self.project_key, error = %e, "job execution error");
                    }
                    if let Some(exit) = self.check_restart() {
                        return exit;
                    }
                }
                Ok(None) => {
                    if let Some(exit) = self.check_restart() {
                        return exit;
                    }
                    tokio::select! {
                        _ = shutdown.notified() => {
                            info!(project = %self.project_key, "worker loop shutting down");
                            return WorkerExit::Shutdown;
                        }
                        _ = tokio::time::sleep(self.config.poll_interval) => {}
                    }
                }
                Err(StoreError::Unavailable(e)) => {
                    // Never drop work: log and retry with backoff
                    warn!(
                        project = %self.project_key,
                        error = %e,
                        backoff_secs = backoff.as_secs(),
                        "job store unavailable, backing off",
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = (backoff * 2).min(self.config.store_backoff_max);
                }
                Err(e) => {
                    error!(project = %self.project_key, error = %e, "unexpected store error");
                    tokio::time::sleep(self.config.poll_interval).await;
                }
            }
        }
    }

    /// Restart is honored only when nothing is running anywhere.
    fn check_restart(&self) -> Option<WorkerExit> {
        if !self.restart.is_requested() {
            return None;
        }
        if self.store.running_count() > 0 {
            info!(
                project = %self.project_key,
                "restart requested but a job is running, deferring",
            );
            return None;
        }
        info!(project = %self.project_key, "restart requested, exiting worker loop");
        Some(WorkerExit::RestartRequested)
    }

    /// Execute one claimed job to a terminal state.
    ///
    /// `popped → executing → {finalizing, continuing}`. In the continuing
    /// arm this iteration ends without touching the transport.
    pub async fn run_one(&self, mut job: Job) -> Result<(), RuntimeError> {
        if self.arena.is_enabled() && job.worktree_dir.is_none() {
            let dir = self
                .arena
                .allocate(&job)
                .map_err(|e| RuntimeError::Workspace(e.to_string()))?;
            if let Some(dir) = dir {
                self.store.set_worktree(&job.id, dir.clone())?;
                job.worktree_dir = Some(dir);
            }
        }

        match self.runner.run(&job).await {
            Err(engine_error) => {
                // Engine-level failure: fail the job and deliver the error.
                // Never routed through the classifier, never continued.
                warn!(job_id = %job.id, error = %engine_error, "engine call failed");
                self.store.mark_failed(&job.id, engine_error.to_string())?;
                let outcome = self
                    .tracker
                    .finalize_error(
                        &job,
                        &format!("The agent session failed: {engine_error}"),
                    )
                    .await;
                self.store.set_delivery(&job.id, outcome.state)?;
                self.arena.reclaim(&job);
            }
            Ok(raw) => {
                let classification = self.classify(&raw.text).await;
                match self.controller.decide(&job, &classification) {
                    Disposition::Continue { next } => {
                        // Complete first so the continuation only becomes
                        // eligible after this job is out of the way. No
                        // reaction: the chain is still in flight.
                        self.store.mark_completed(&job.id)?;
                        self.store.enqueue(next)?;
                    }
                    Disposition::Finalize { exhausted } => {
                        self.store.mark_completed(&job.id)?;
                        let outcome = match classification.kind {
                            OutputKind::Error => {
                                let stripped = crate::postprocess::strip_noise(&raw.text);
                                let message = if stripped.is_empty() {
                                    "The agent reported an error without details.".to_string()
                                } else {
                                    stripped
                                };
                                self.tracker.finalize_error(&job, &message).await
                            }
                            _ => self.tracker.finalize_reply(&job, &raw.text, exhausted).await,
                        };
                        self.store.set_delivery(&job.id, outcome.state)?;
                        self.arena.reclaim(&job);
                    }
                }
            }
        }

        Ok(())
    }

    /// Classify with the service, falling back to the conservative
    /// heuristic when it is unavailable. The confidence-floor policy is
    /// applied in exactly one place: here.
    async fn classify(&self, text: &str) -> valor_core::ClassificationResult {
        let raw = match self.classifier.classify(text, None).await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "classifier unavailable, falling back to heuristic");
                match self.heuristic.classify(text, None).await {
                    Ok(result) => result,
                    Err(e) => {
                        // The heuristic is infallible in practice; if it
                        // ever isn't, defer to a human.
                        warn!(error = %e, "heuristic classifier failed");
                        valor_core::ClassificationResult::new(
                            OutputKind::Question,
                            0.0,
                            "classification unavailable",
                        )
                    }
                }
            }
        };
        raw.resolve()
    }

    /// Run at most one queued job. Returns whether one ran.
    pub async fn tick(&self) -> Result<bool, RuntimeError> {
        match self.store.pop_next(&self.project_key)? {
            Some(job) => {
                self.run_one(job).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn project_key(&self) -> &str {
        &self.project_key
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
