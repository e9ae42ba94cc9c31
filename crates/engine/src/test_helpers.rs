// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for engine tests.
#![cfg_attr(coverage_nightly, coverage(off))]

use crate::{ActivityLog, EngineConfig, RestartSignal, WorkerLoop};
use std::time::Duration;
use tempfile::TempDir;
use valor_adapters::agent::FakeSessionEngine;
use valor_adapters::classify::FakeClassifier;
use valor_adapters::transport::FakeChatTransport;
use valor_core::{FakeClock, JobConfig, SequentialIdGen};
use valor_storage::JobStore;

pub type TestStore = JobStore<FakeClock, SequentialIdGen>;
pub type TestWorker =
    WorkerLoop<FakeSessionEngine, FakeClassifier, FakeChatTransport, FakeClock, SequentialIdGen>;

pub struct Fixture {
    pub store: TestStore,
    pub engine: FakeSessionEngine,
    pub classifier: FakeClassifier,
    pub transport: FakeChatTransport,
    pub activity: ActivityLog,
    pub clock: FakeClock,
    pub restart: RestartSignal,
    pub worker: TestWorker,
    // Held for the lifetime of the fixture
    _dir: TempDir,
}

/// A worker wired entirely to fakes, with a short session timeout.
pub fn fixture(project: &str) -> Fixture {
    fixture_with_config(project, test_config())
}

pub fn fixture_with_config(project: &str, config: EngineConfig) -> Fixture {
    let dir = tempfile::tempdir().expect("tempdir");
    let clock = FakeClock::new();
    let store = JobStore::open(dir.path(), clock.clone(), SequentialIdGen::new("job"))
        .expect("open store");
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
        config,
    );

    Fixture {
        store,
        engine,
        classifier,
        transport,
        activity,
        clock,
        restart,
        worker,
        _dir: dir,
    }
}

pub fn test_config() -> EngineConfig {
    EngineConfig {
        session_timeout: Duration::from_millis(200),
        poll_interval: Duration::from_millis(10),
        ..EngineConfig::default()
    }
}

/// A plausible inbound-message job config.
pub fn message_config(project: &str, session: &str, text: &str) -> JobConfig {
    JobConfig::builder(project, session)
        .working_dir(format!("/srv/projects/{project}"))
        .message(text)
        .sender("sam")
        .chat("chat-1", format!("msg-{session}"))
        .build()
}
