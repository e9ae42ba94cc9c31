// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Crash recovery across process restarts: the store directory survives,
//! a new world opens it, and interrupted work resumes exactly once.

use crate::prelude::*;
use valor_core::{FakeClock, JobStatus, OutputKind, Reaction};

#[tokio::test]
async fn interrupted_job_is_revived_and_answered_after_restart() {
    let clock = FakeClock::new();
    let dir = tempfile::tempdir().unwrap();

    // First process: the job starts running, then the process dies
    {
        let store = open_store(dir.path(), &clock);
        store
            .enqueue(incoming("blog", "sess-1", "fix the RSS feed"))
            .unwrap();
        store.pop_next("blog").unwrap().unwrap();
        // Process crashes here; nothing is marked terminal
    }

    // Second process: recovery runs, then the worker picks up the revival
    let w = world_in("blog", dir, clock);
    let report = w.store.recover(|_| false).unwrap();
    assert_eq!(report.revived.len(), 1);

    w.classifier.push_kind(OutputKind::Completion);
    w.engine.push_text("Feed fixed; items render again.");
    assert_eq!(w.drain().await, 1);

    // The user still gets exactly one answer for the original message
    assert_eq!(w.transport.texts(), vec!["Feed fixed; items render again."]);
    assert_eq!(w.transport.reactions(), vec![Reaction::Replied]);

    // The revived job kept the session identity and resumed it
    let requests = w.engine.requests();
    assert!(requests[0].resume);
    assert_eq!(requests[0].session_id.as_str(), "sess-1");
}

#[tokio::test]
async fn double_recovery_does_not_storm() {
    let clock = FakeClock::new();
    let dir = tempfile::tempdir().unwrap();

    {
        let store = open_store(dir.path(), &clock);
        store
            .enqueue(incoming("blog", "sess-1", "fix the RSS feed"))
            .unwrap();
        store.pop_next("blog").unwrap().unwrap();
    }

    let w = world_in("blog", dir, clock);
    // Recovery running twice (e.g. a supervisor retry) yields one revival
    let first = w.store.recover(|_| false).unwrap();
    let second = w.store.recover(|_| false).unwrap();
    assert_eq!(first.revived.len(), 1);
    assert!(second.is_empty());
    assert_eq!(w.store.query("blog", JobStatus::Pending).len(), 1);
}

#[tokio::test]
async fn crash_of_a_revival_gives_up_instead_of_looping() {
    let clock = FakeClock::new();
    let dir = tempfile::tempdir().unwrap();

    {
        let store = open_store(dir.path(), &clock);
        store
            .enqueue(incoming("blog", "sess-1", "fix the RSS feed"))
            .unwrap();
        store.pop_next("blog").unwrap().unwrap();
    }

    // First restart: revival enqueued and started
    let clock2 = clock.clone();
    let dir = {
        let w = world_in("blog", dir, clock2);
        w.store.recover(|_| false).unwrap();
        w.store.pop_next("blog").unwrap().unwrap();
        // Process crashes again mid-revival
        w.dir
    };

    // Second restart: no second revival for the same session
    let w = world_in("blog", dir, clock);
    let report = w.store.recover(|_| false).unwrap();
    assert!(report.revived.is_empty());
    assert_eq!(report.failed.len(), 1);
    assert!(w.store.query("blog", JobStatus::Pending).is_empty());
    assert_eq!(w.store.query("blog", JobStatus::Failed).len(), 2);
}
