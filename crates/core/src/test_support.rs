// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared builders for other crates' tests.
#![cfg_attr(coverage_nightly, coverage(off))]
#![allow(clippy::unwrap_used)]

use crate::{Job, JobConfig, JobId};

/// A plausible inbound-message job config.
pub fn job_config(project: &str, session: &str) -> JobConfig {
    JobConfig::builder(project, session)
        .working_dir(format!("/srv/projects/{project}"))
        .message("wire up the new sensor")
        .sender("sam")
        .chat("chat-1", format!("msg-{session}"))
        .build()
}

/// A pending job as the store would create it.
pub fn job(id: &str, project: &str, session: &str) -> Job {
    Job::new(JobId::new(id), job_config(project, session), 1_000)
}
