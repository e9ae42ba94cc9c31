// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job record and state machine.

use crate::delivery::DeliveryState;
use crate::session::SessionId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

crate::define_id! {
    /// Unique identifier for a job, assigned by the store at enqueue.
    #[derive(Default)]
    pub struct JobId;
}

/// Maximum number of automatic continuations along one session chain.
/// Beyond this, an intermediate result is force-finalized as a completion
/// rather than looping or being dropped.
pub const MAX_AUTO_CONTINUES: u32 = 3;

/// Status of a job. Transitions only move forward:
/// `Pending → Running → {Completed, Failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Whether the forward-only state machine permits this transition.
    pub fn can_advance_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Pending, JobStatus::Running)
                | (JobStatus::Running, JobStatus::Completed)
                | (JobStatus::Running, JobStatus::Failed)
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Configuration for enqueueing a new job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    pub project_key: String,
    pub session_id: SessionId,
    pub working_dir: PathBuf,
    pub message_text: String,
    pub sender_name: String,
    pub chat_id: String,
    pub message_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_title: Option<String>,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub auto_continue_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revival_context: Option<String>,
}

impl JobConfig {
    pub fn builder(
        project_key: impl Into<String>,
        session_id: impl Into<SessionId>,
    ) -> JobConfigBuilder {
        JobConfigBuilder {
            config: JobConfig {
                project_key: project_key.into(),
                session_id: session_id.into(),
                working_dir: PathBuf::new(),
                message_text: String::new(),
                sender_name: String::new(),
                chat_id: String::new(),
                message_id: String::new(),
                chat_title: None,
                priority: 0,
                auto_continue_count: 0,
                revival_context: None,
            },
        }
    }
}

/// Builder for [`JobConfig`].
#[derive(Debug, Clone)]
pub struct JobConfigBuilder {
    config: JobConfig,
}

impl JobConfigBuilder {
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.working_dir = dir.into();
        self
    }

    pub fn message(mut self, text: impl Into<String>) -> Self {
        self.config.message_text = text.into();
        self
    }

    pub fn sender(mut self, name: impl Into<String>) -> Self {
        self.config.sender_name = name.into();
        self
    }

    pub fn chat(mut self, chat_id: impl Into<String>, message_id: impl Into<String>) -> Self {
        self.config.chat_id = chat_id.into();
        self.config.message_id = message_id.into();
        self
    }

    pub fn chat_title(mut self, title: impl Into<String>) -> Self {
        self.config.chat_title = Some(title.into());
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.config.priority = priority;
        self
    }

    pub fn revival_context(mut self, context: impl Into<String>) -> Self {
        self.config.revival_context = Some(context.into());
        self
    }

    pub fn build(self) -> JobConfig {
        self.config
    }
}

/// A unit of work: one message (or continuation) to run through an agent
/// session for one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub project_key: String,
    pub status: JobStatus,
    /// Higher runs first within a project.
    pub priority: i32,
    pub created_at_ms: u64,
    /// Set when the job is popped; used for runaway detection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at_ms: Option<u64>,
    /// Set when the job reaches a terminal status; used for pruning.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at_ms: Option<u64>,
    pub session_id: SessionId,
    pub working_dir: PathBuf,
    pub message_text: String,
    pub sender_name: String,
    pub chat_id: String,
    pub message_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_title: Option<String>,
    #[serde(default)]
    pub auto_continue_count: u32,
    /// Set when this job is a recovery re-enqueue after a crash or a
    /// watchdog revival. At most one revival per session chain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revival_context: Option<String>,
    /// Set once isolated-filesystem execution is assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worktree_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Terminal delivery outcome, recorded by the delivery tracker.
    #[serde(default = "DeliveryState::received")]
    pub delivery: DeliveryState,
}

impl Job {
    pub fn new(id: JobId, config: JobConfig, epoch_ms: u64) -> Self {
        Self {
            id,
            project_key: config.project_key,
            status: JobStatus::Pending,
            priority: config.priority,
            created_at_ms: epoch_ms,
            started_at_ms: None,
            finished_at_ms: None,
            session_id: config.session_id,
            working_dir: config.working_dir,
            message_text: config.message_text,
            sender_name: config.sender_name,
            chat_id: config.chat_id,
            message_id: config.message_id,
            chat_title: config.chat_title,
            auto_continue_count: config.auto_continue_count,
            revival_context: config.revival_context,
            worktree_dir: None,
            error: None,
            delivery: DeliveryState::Received,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Whether the continuation budget for this chain is spent.
    pub fn continues_exhausted(&self) -> bool {
        self.auto_continue_count >= MAX_AUTO_CONTINUES
    }

    /// Derive the config for the next auto-continuation job.
    ///
    /// Keeps the session identity and the original chat/message ids so the
    /// eventual reaction still targets the message the user sent, and bumps
    /// the continuation counter. The prompt is the classifier's coaching
    /// message when one exists.
    pub fn continuation(&self, coaching: Option<&str>) -> JobConfig {
        JobConfig {
            project_key: self.project_key.clone(),
            session_id: self.session_id.clone(),
            working_dir: self.working_dir.clone(),
            message_text: coaching.unwrap_or("continue").to_string(),
            sender_name: self.sender_name.clone(),
            chat_id: self.chat_id.clone(),
            message_id: self.message_id.clone(),
            chat_title: self.chat_title.clone(),
            priority: self.priority,
            auto_continue_count: self.auto_continue_count + 1,
            revival_context: None,
        }
    }

    /// Whether a resumed engine session should be requested for this job.
    ///
    /// Continuations and revivals run against an existing session; a fresh
    /// exchange starts a new one.
    pub fn resumes_session(&self) -> bool {
        self.auto_continue_count > 0 || self.revival_context.is_some()
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
