// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use valor_core::test_support;
use valor_core::JobEvent;

fn state_with_job(id: &str) -> StoreState {
    let mut state = StoreState::default();
    state.apply(&JobEvent::Enqueued {
        job: test_support::job(id, "blog", "sess-1"),
    });
    state
}

#[test]
fn save_and_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jobs.snapshot");

    let snapshot = Snapshot::new(7, state_with_job("job-1"));
    snapshot.save(&path).unwrap();

    let loaded = Snapshot::load(&path).unwrap().unwrap();
    assert_eq!(loaded.seq, 7);
    assert!(loaded.state.get(&"job-1".into()).is_some());
}

#[test]
fn load_missing_returns_none() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jobs.snapshot");
    assert!(Snapshot::load(&path).unwrap().is_none());
}

#[test]
fn corrupt_snapshot_moves_to_bak() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jobs.snapshot");
    std::fs::write(&path, b"{not json").unwrap();

    assert!(Snapshot::load(&path).unwrap().is_none());
    assert!(!path.exists());
    assert!(path.with_extension("bak").exists());
}

#[test]
fn save_replaces_existing_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jobs.snapshot");

    Snapshot::new(1, state_with_job("job-1")).save(&path).unwrap();
    Snapshot::new(2, state_with_job("job-2")).save(&path).unwrap();

    let loaded = Snapshot::load(&path).unwrap().unwrap();
    assert_eq!(loaded.seq, 2);
    assert!(loaded.state.get(&"job-2".into()).is_some());
    assert!(loaded.state.get(&"job-1".into()).is_none());
}

#[test]
fn bak_rotation_keeps_bounded_history() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jobs.snapshot");

    for _ in 0..5 {
        std::fs::write(&path, b"{not json").unwrap();
        assert!(Snapshot::load(&path).unwrap().is_none());
    }

    assert!(path.with_extension("bak").exists());
    assert!(path.with_extension("bak.2").exists());
    assert!(path.with_extension("bak.3").exists());
    assert!(!path.with_extension("bak.4").exists());
}
