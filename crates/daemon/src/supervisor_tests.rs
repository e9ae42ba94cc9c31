// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;
use valor_adapters::agent::{FakeSessionEngine, ProcessEngineConfig};
use valor_adapters::classify::{CommandClassifierConfig, FakeClassifier};
use valor_adapters::notify::FakeNotifyAdapter;
use valor_adapters::transport::FakeChatTransport;
use valor_core::{FakeClock, JobConfig, JobStatus, SequentialIdGen};
use valor_engine::EngineConfig;

type TestSupervisor = Supervisor<
    FakeSessionEngine,
    FakeClassifier,
    FakeChatTransport,
    FakeNotifyAdapter,
    FakeClock,
    SequentialIdGen,
>;

struct Rig {
    store: JobStore<FakeClock, SequentialIdGen>,
    engine: FakeSessionEngine,
    transport: FakeChatTransport,
    restart: RestartSignal,
    supervisor: TestSupervisor,
    _dir: tempfile::TempDir,
}

fn rig() -> Rig {
    let dir = tempfile::tempdir().unwrap();
    let clock = FakeClock::new();
    let store = JobStore::open(&dir.path().join("store"), clock.clone(), SequentialIdGen::new("job"))
        .unwrap();
    let engine = FakeSessionEngine::new();
    let transport = FakeChatTransport::new();
    let restart = RestartSignal::new();

    let config = Config {
        state_dir: dir.path().to_path_buf(),
        store_dir: dir.path().join("store"),
        logs_dir: dir.path().join("logs"),
        restart_flag_path: dir.path().join("restart.flag"),
        engine: EngineConfig {
            session_timeout: Duration::from_millis(200),
            poll_interval: Duration::from_millis(10),
            ..EngineConfig::default()
        },
        agent: ProcessEngineConfig::new("echo"),
        classifier: CommandClassifierConfig::new("true"),
    };

    let supervisor = Supervisor::new(
        store.clone(),
        engine.clone(),
        FakeClassifier::new(),
        transport.clone(),
        FakeNotifyAdapter::new(),
        clock,
        restart.clone(),
        config,
    );

    Rig {
        store,
        engine,
        transport,
        restart,
        supervisor,
        _dir: dir,
    }
}

fn job(project: &str, session: &str) -> JobConfig {
    JobConfig::builder(project, session)
        .working_dir("/tmp")
        .message("work")
        .sender("sam")
        .chat("chat-1", "msg-1")
        .build()
}

#[tokio::test]
async fn spawns_workers_per_project_and_honors_restart() {
    let r = rig();
    r.engine.push_text("blog done");
    r.engine.push_text("home done");
    r.store.enqueue(job("blog", "s1")).unwrap();
    r.store.enqueue(job("home", "s2")).unwrap();
    r.restart.request();

    let shutdown = Arc::new(Notify::new());
    let exit = tokio::time::timeout(Duration::from_secs(10), r.supervisor.run(shutdown))
        .await
        .expect("supervisor should exit");

    assert_eq!(exit, SupervisorExit::Restart);
    // Both projects' queues drained before the restart was honored
    assert_eq!(r.store.query("blog", JobStatus::Completed).len(), 1);
    assert_eq!(r.store.query("home", JobStatus::Completed).len(), 1);
    assert_eq!(r.transport.texts().len(), 2);
}

#[tokio::test]
async fn shutdown_stops_idle_supervisor() {
    let r = rig();
    let shutdown = Arc::new(Notify::new());

    let handle = {
        let shutdown = Arc::clone(&shutdown);
        tokio::spawn(r.supervisor.run(shutdown))
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    shutdown.notify_waiters();

    let exit = tokio::time::timeout(Duration::from_secs(10), handle)
        .await
        .expect("supervisor should exit")
        .unwrap();
    assert_eq!(exit, SupervisorExit::Shutdown);
}
