// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace arena for isolated job execution.
//!
//! The sequential baseline runs every job of a project in the shared
//! working tree, which is exclusively owned by the running job. With a
//! configured root, each job instead gets a named workspace directory,
//! allocated when the job starts and reclaimed when it completes — the
//! shape that lets jobs within one project run concurrently later without
//! touching the store.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use valor_core::Job;

#[derive(Clone, Default)]
pub struct WorkspaceArena {
    root: Option<PathBuf>,
}

impl WorkspaceArena {
    /// Arena that never isolates; jobs run in the shared working tree.
    pub fn disabled() -> Self {
        Self { root: None }
    }

    /// Arena allocating per-job directories under `root`.
    pub fn rooted(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.root.is_some()
    }

    /// Allocate a workspace for the job. Returns `None` when isolation is
    /// disabled. The directory is created empty; populating it (clone,
    /// checkout) is the agent's first order of business.
    pub fn allocate(&self, job: &Job) -> std::io::Result<Option<PathBuf>> {
        let Some(root) = &self.root else {
            return Ok(None);
        };
        let dir = root
            .join(&job.project_key)
            .join(format!("job-{}", job.id.short(12)));
        std::fs::create_dir_all(&dir)?;
        debug!(job_id = %job.id, dir = %dir.display(), "allocated workspace");
        Ok(Some(dir))
    }

    /// Reclaim the job's workspace, if it lives under this arena.
    pub fn reclaim(&self, job: &Job) {
        let Some(root) = &self.root else { return };
        let Some(dir) = &job.worktree_dir else { return };
        if !dir.starts_with(root) {
            // Never delete anything the arena did not allocate
            return;
        }
        if let Err(e) = remove_tree(dir) {
            warn!(job_id = %job.id, dir = %dir.display(), error = %e, "workspace reclaim failed");
        } else {
            debug!(job_id = %job.id, dir = %dir.display(), "reclaimed workspace");
        }
    }
}

fn remove_tree(dir: &Path) -> std::io::Result<()> {
    if dir.exists() {
        std::fs::remove_dir_all(dir)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "workspace_tests.rs"]
mod tests;
