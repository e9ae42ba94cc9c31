// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The restart signal is cooperative: polled between jobs, never
//! interrupting one in flight.

use crate::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use valor_core::{JobStatus, OutputKind};
use valor_engine::WorkerExit;

#[tokio::test]
async fn restart_drains_the_queue_first() {
    let w = world("blog");
    for n in 0..3 {
        w.classifier.push_kind(OutputKind::Completion);
        w.engine.push_text(&format!("done {n}"));
        w.store
            .enqueue(incoming("blog", &format!("sess-{n}"), "work"))
            .unwrap();
    }

    w.restart.request();

    let shutdown = Arc::new(Notify::new());
    let exit = tokio::time::timeout(Duration::from_secs(5), w.worker.run(shutdown))
        .await
        .expect("worker should exit");

    assert_eq!(exit, WorkerExit::RestartRequested);
    // Every queued job finished before the restart was honored
    assert_eq!(w.store.query("blog", JobStatus::Completed).len(), 3);
    assert_eq!(w.transport.texts().len(), 3);
}

#[tokio::test]
async fn restart_flag_file_is_honored_between_jobs() {
    let dir = tempfile::tempdir().unwrap();
    let clock = valor_core::FakeClock::new();
    let flag = dir.path().join("restart.flag");

    let store = open_store(dir.path(), &clock);
    let engine = valor_adapters::agent::FakeSessionEngine::new();
    let classifier = valor_adapters::classify::FakeClassifier::new();
    let transport = valor_adapters::transport::FakeChatTransport::new();
    let restart = valor_engine::RestartSignal::with_flag_file(&flag);

    let worker = valor_engine::WorkerLoop::new(
        "blog",
        store.clone(),
        engine.clone(),
        classifier,
        transport,
        valor_engine::ActivityLog::new(),
        clock,
        restart,
        engine_config(),
    );

    classifier_completion(&engine, &store).await;
    // An external updater touches the flag file
    std::fs::write(&flag, b"").unwrap();

    let shutdown = Arc::new(Notify::new());
    let exit = tokio::time::timeout(Duration::from_secs(5), worker.run(shutdown))
        .await
        .expect("worker should exit");
    assert_eq!(exit, WorkerExit::RestartRequested);
}

async fn classifier_completion(
    engine: &valor_adapters::agent::FakeSessionEngine,
    store: &SpecStore,
) {
    engine.push_text("done");
    store.enqueue(incoming("blog", "sess-1", "one job")).unwrap();
}
