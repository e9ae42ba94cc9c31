// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Watchdog monitor.
//!
//! Runs on its own interval, out-of-band from the worker loops. It reads
//! the store and the activity log, never the transport. A detected
//! session gets one bounded revival — drawn from the same budget crash
//! recovery uses — and past that a human is notified.

use crate::activity::ActivityLog;
use crate::config::WatchdogConfig;
use std::time::Duration;
use tracing::{info, warn};
use valor_adapters::notify::NotifyAdapter;
use valor_core::{Clock, IdGen, JobId, SessionId};
use valor_storage::{JobStore, StoreError};

/// What tripped the watchdog for a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchdogTrigger {
    /// No liveness signal for longer than the silence threshold.
    Silence { idle: Duration },
    /// Too many consecutive session errors.
    ErrorCascade { count: u32 },
    /// Running far beyond the expected duration.
    Runaway { running: Duration },
}

impl std::fmt::Display for WatchdogTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WatchdogTrigger::Silence { idle } => write!(f, "silent for {}s", idle.as_secs()),
            WatchdogTrigger::ErrorCascade { count } => {
                write!(f, "{count} consecutive session errors")
            }
            WatchdogTrigger::Runaway { running } => {
                write!(f, "running for {}s", running.as_secs())
            }
        }
    }
}

/// What the watchdog did about a finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchdogAction {
    /// The job was failed and re-enqueued once.
    Revived { new_job: JobId },
    /// Revival budget spent; the job was failed and a human notified.
    Escalated,
}

/// One detection from a sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchdogFinding {
    pub job_id: JobId,
    pub session_id: SessionId,
    pub trigger: WatchdogTrigger,
    pub action: WatchdogAction,
}

/// Out-of-band monitor for stuck, looping or runaway sessions.
pub struct Watchdog<C, G, N>
where
    C: Clock,
    G: IdGen,
    N: NotifyAdapter,
{
    store: JobStore<C, G>,
    activity: ActivityLog,
    notify: N,
    clock: C,
    config: WatchdogConfig,
}

impl<C, G, N> Watchdog<C, G, N>
where
    C: Clock,
    G: IdGen,
    N: NotifyAdapter,
{
    pub fn new(
        store: JobStore<C, G>,
        activity: ActivityLog,
        notify: N,
        clock: C,
        config: WatchdogConfig,
    ) -> Self {
        Self {
            store,
            activity,
            notify,
            clock,
            config,
        }
    }

    /// Sweep forever on the configured interval.
    pub async fn run(self) {
        loop {
            tokio::time::sleep(self.config.sweep_interval).await;
            if let Err(e) = self.sweep().await {
                warn!(error = %e, "watchdog sweep failed");
            }
        }
    }

    /// One pass over all running jobs. Returns what was detected and done.
    pub async fn sweep(&self) -> Result<Vec<WatchdogFinding>, StoreError> {
        let now_ms = self.clock.epoch_ms();
        let mut findings = Vec::new();

        for job in self.store.running_jobs() {
            let Some(trigger) = self.detect(&job, now_ms) else {
                continue;
            };

            warn!(
                job_id = %job.id,
                session_id = %job.session_id,
                project = %job.project_key,
                trigger = %trigger,
                "watchdog detected an unhealthy session",
            );

            let action = match self
                .store
                .fail_and_revive(&job.id, &format!("watchdog: {trigger}"))?
            {
                Some(new_job) => {
                    info!(job_id = %job.id, revived = %new_job, "watchdog revived session");
                    WatchdogAction::Revived { new_job }
                }
                None => {
                    let title = format!("Valor session needs attention: {}", job.project_key);
                    let body = format!(
                        "Session {} was {} and its revival budget is spent. \
                         Original message: {:.120}",
                        job.session_id, trigger, job.message_text
                    );
                    if let Err(e) = self.notify.notify(&title, &body).await {
                        warn!(error = %e, "watchdog notification failed");
                    }
                    WatchdogAction::Escalated
                }
            };

            self.activity.forget(&job.session_id);
            findings.push(WatchdogFinding {
                job_id: job.id.clone(),
                session_id: job.session_id.clone(),
                trigger,
                action,
            });
        }

        Ok(findings)
    }

    fn detect(&self, job: &valor_core::Job, now_ms: u64) -> Option<WatchdogTrigger> {
        let errors = self.activity.consecutive_errors(&job.session_id);
        if errors >= self.config.error_cascade_limit {
            return Some(WatchdogTrigger::ErrorCascade { count: errors });
        }

        let last_activity = self
            .activity
            .last_activity_ms(&job.session_id)
            .or(job.started_at_ms)
            .unwrap_or(job.created_at_ms);
        let idle_ms = now_ms.saturating_sub(last_activity);
        if idle_ms > self.config.silence_threshold.as_millis() as u64 {
            return Some(WatchdogTrigger::Silence {
                idle: Duration::from_millis(idle_ms),
            });
        }

        if let Some(started) = job.started_at_ms {
            let running_ms = now_ms.saturating_sub(started);
            if running_ms > self.config.runaway_duration.as_millis() as u64 {
                return Some(WatchdogTrigger::Runaway {
                    running: Duration::from_millis(running_ms),
                });
            }
        }

        None
    }
}

#[cfg(test)]
#[path = "watchdog_tests.rs"]
mod tests;
