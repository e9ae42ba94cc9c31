// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker supervision.
//!
//! Spawns one worker loop per project key, rescans the store for new
//! projects, and runs the watchdog and periodic checkpointing alongside.
//! A worker honoring the restart signal brings the whole supervisor down
//! so the process manager can start the new binary.

use crate::config::Config;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinSet;
use tracing::{info, warn};
use valor_adapters::agent::SessionEngine;
use valor_adapters::classify::Classifier;
use valor_adapters::notify::NotifyAdapter;
use valor_adapters::transport::ChatTransport;
use valor_core::{Clock, IdGen};
use valor_engine::{ActivityLog, RestartSignal, Watchdog, WorkerExit, WorkerLoop};
use valor_storage::JobStore;

/// How often the supervisor rescans for new project keys.
const PROJECT_SCAN_INTERVAL: Duration = Duration::from_secs(2);

/// How often the store is checkpointed.
const CHECKPOINT_INTERVAL: Duration = Duration::from_secs(300);

/// Terminal jobs older than this are pruned, once their delivery
/// outcome is on record.
const JOB_RETENTION: Duration = Duration::from_secs(7 * 24 * 3600);

/// Why the supervisor returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorExit {
    /// A worker honored the restart signal; exit so the updated binary
    /// can take over.
    Restart,
    /// Shutdown was requested.
    Shutdown,
}

/// Spawns and supervises the per-project workers plus the watchdog.
pub struct Supervisor<E, K, T, N, C, G>
where
    E: SessionEngine,
    K: Classifier,
    T: ChatTransport,
    N: NotifyAdapter,
    C: Clock,
    G: IdGen,
{
    store: JobStore<C, G>,
    engine: E,
    classifier: K,
    transport: T,
    notify: N,
    clock: C,
    activity: ActivityLog,
    restart: RestartSignal,
    config: Config,
}

impl<E, K, T, N, C, G> Supervisor<E, K, T, N, C, G>
where
    E: SessionEngine,
    K: Classifier,
    T: ChatTransport,
    N: NotifyAdapter,
    C: Clock,
    G: IdGen + 'static,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: JobStore<C, G>,
        engine: E,
        classifier: K,
        transport: T,
        notify: N,
        clock: C,
        restart: RestartSignal,
        config: Config,
    ) -> Self {
        Self {
            store,
            engine,
            classifier,
            transport,
            notify,
            clock,
            activity: ActivityLog::new(),
            restart,
            config,
        }
    }

    /// Run until shutdown or restart.
    pub async fn run(self, shutdown: Arc<Notify>) -> SupervisorExit {
        let watchdog = Watchdog::new(
            self.store.clone(),
            self.activity.clone(),
            self.notify.clone(),
            self.clock.clone(),
            self.config.engine.watchdog.clone(),
        );
        let watchdog_handle = tokio::spawn(watchdog.run());

        let checkpoint_handle = {
            let store = self.store.clone();
            tokio::spawn(async move {
                loop {
                    tokio::time::sleep(CHECKPOINT_INTERVAL).await;
                    match store.prune_stale(JOB_RETENTION, |j| j.delivery.is_terminal()) {
                        Ok(pruned) if !pruned.is_empty() => {
                            info!(count = pruned.len(), "pruned old terminal jobs");
                        }
                        Ok(_) => {}
                        Err(e) => warn!(error = %e, "prune failed"),
                    }
                    if let Err(e) = store.checkpoint() {
                        warn!(error = %e, "periodic checkpoint failed");
                    }
                }
            })
        };

        let (exit_tx, mut exit_rx) = mpsc::channel::<WorkerExit>(16);
        let worker_shutdown = Arc::new(Notify::new());
        let mut workers = JoinSet::new();
        let mut spawned: HashSet<String> = HashSet::new();
        let mut scan = tokio::time::interval(PROJECT_SCAN_INTERVAL);

        let exit = loop {
            tokio::select! {
                _ = scan.tick() => {
                    for project in self.store.active_projects() {
                        if spawned.contains(&project) {
                            continue;
                        }
                        info!(project = %project, "spawning worker loop");
                        spawned.insert(project.clone());

                        let worker = WorkerLoop::new(
                            project,
                            self.store.clone(),
                            self.engine.clone(),
                            self.classifier.clone(),
                            self.transport.clone(),
                            self.activity.clone(),
                            self.clock.clone(),
                            self.restart.clone(),
                            self.config.engine.clone(),
                        );
                        let worker_shutdown = Arc::clone(&worker_shutdown);
                        let exit_tx = exit_tx.clone();
                        workers.spawn(async move {
                            let exit = worker.run(worker_shutdown).await;
                            let _ = exit_tx.send(exit).await;
                        });
                    }
                }
                Some(worker_exit) = exit_rx.recv() => {
                    if worker_exit == WorkerExit::RestartRequested {
                        info!("worker honored restart signal, stopping supervisor");
                        break SupervisorExit::Restart;
                    }
                }
                _ = shutdown.notified() => {
                    info!("supervisor shutting down");
                    break SupervisorExit::Shutdown;
                }
            }
        };

        watchdog_handle.abort();
        checkpoint_handle.abort();

        // Wake idle workers until every loop has returned; a busy worker
        // finishes its current job first (restart/shutdown never preempt).
        while !workers.is_empty() {
            worker_shutdown.notify_waiters();
            tokio::select! {
                _ = workers.join_next() => {}
                _ = tokio::time::sleep(Duration::from_millis(100)) => {}
            }
        }

        if let Err(e) = self.store.checkpoint() {
            warn!(error = %e, "final checkpoint failed");
        }

        exit
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
