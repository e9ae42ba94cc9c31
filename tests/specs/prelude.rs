// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test helpers for behavioral specifications.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use valor_adapters::agent::FakeSessionEngine;
use valor_adapters::classify::FakeClassifier;
use valor_adapters::transport::FakeChatTransport;
use valor_core::{FakeClock, JobConfig, SequentialIdGen};
use valor_engine::{ActivityLog, EngineConfig, RestartSignal, WorkerLoop};
use valor_storage::JobStore;

pub type SpecStore = JobStore<FakeClock, SequentialIdGen>;
pub type SpecWorker =
    WorkerLoop<FakeSessionEngine, FakeClassifier, FakeChatTransport, FakeClock, SequentialIdGen>;

pub struct World {
    pub store: SpecStore,
    pub engine: FakeSessionEngine,
    pub classifier: FakeClassifier,
    pub transport: FakeChatTransport,
    pub activity: ActivityLog,
    pub clock: FakeClock,
    pub restart: RestartSignal,
    pub worker: SpecWorker,
    pub dir: TempDir,
}

/// A fully-wired single-project world backed by fakes.
pub fn world(project: &str) -> World {
    let dir = tempfile::tempdir().unwrap();
    let clock = FakeClock::new();
    world_in(project, dir, clock)
}

/// Build a world over an existing state directory (for restart specs).
pub fn world_in(project: &str, dir: TempDir, clock: FakeClock) -> World {
    let store = open_store(dir.path(), &clock);
    let engine = FakeSessionEngine::new();
    let classifier = FakeClassifier::new();
    let transport = FakeChatTransport::new();
    let activity = ActivityLog::new();
    let restart = RestartSignal::new();

    let worker = WorkerLoop::new(
        project,
        store.clone(),
        engine.clone(),
        classifier.clone(),
        transport.clone(),
        activity.clone(),
        clock.clone(),
        restart.clone(),
        engine_config(),
    );

    World {
        store,
        engine,
        classifier,
        transport,
        activity,
        clock,
        restart,
        worker,
        dir,
    }
}

pub fn open_store(dir: &Path, clock: &FakeClock) -> SpecStore {
    JobStore::open(dir, clock.clone(), SequentialIdGen::new("job")).unwrap()
}

pub fn engine_config() -> EngineConfig {
    EngineConfig {
        session_timeout: Duration::from_millis(200),
        poll_interval: Duration::from_millis(10),
        ..EngineConfig::default()
    }
}

/// An inbound chat message turned into a job config.
pub fn incoming(project: &str, session: &str, text: &str) -> JobConfig {
    JobConfig::builder(project, session)
        .working_dir(format!("/srv/projects/{project}"))
        .message(text)
        .sender("sam")
        .chat("chat-main", format!("msg-{session}"))
        .chat_title("Valor Ops")
        .build()
}

impl World {
    /// Run queued jobs to quiescence, returning how many ran.
    pub async fn drain(&self) -> usize {
        let mut ran = 0;
        while self.worker.tick().await.unwrap() {
            ran += 1;
            assert!(ran < 64, "worker did not quiesce");
        }
        ran
    }
}
