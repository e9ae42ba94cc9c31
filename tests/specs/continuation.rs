// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded auto-continuation along a session chain.

use crate::prelude::*;
use valor_core::{JobStatus, OutputKind, Reaction, MAX_AUTO_CONTINUES};

#[tokio::test]
async fn status_chain_resumes_one_session_and_replies_once() {
    let w = world("blog");
    w.store
        .enqueue(incoming("blog", "sess-1", "migrate the database"))
        .unwrap();

    w.classifier.push_status("name the tables you migrated");
    w.engine.push_text("Migrating tables now");
    w.classifier.push_kind(OutputKind::Completion);
    w.engine.push_text("Migrated users, posts and tags. All checks green.");

    assert_eq!(w.drain().await, 2);

    // One session, resumed for the continuation
    let requests = w.engine.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].session_id, requests[1].session_id);
    assert!(!requests[0].resume);
    assert!(requests[1].resume);
    // The coaching message became the continuation prompt
    assert_eq!(requests[1].prompt, "name the tables you migrated");

    // Exactly one reply and one reaction for the whole exchange
    assert_eq!(
        w.transport.texts(),
        vec!["Migrated users, posts and tags. All checks green."]
    );
    assert_eq!(w.transport.reactions(), vec![Reaction::Replied]);
}

#[tokio::test]
async fn endless_status_is_cut_off_at_the_cap() {
    let w = world("blog");
    w.store
        .enqueue(incoming("blog", "sess-1", "migrate the database"))
        .unwrap();

    // The agent never stops reporting progress
    for round in 0..=MAX_AUTO_CONTINUES {
        w.classifier.push_status("keep going");
        w.engine.push_text(&format!("still working, round {round}"));
    }

    let ran = w.drain().await;
    assert_eq!(ran, MAX_AUTO_CONTINUES as usize + 1);

    // The final status was delivered as a completion with the note
    let texts = w.transport.texts();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains("Auto-continuation limit"));

    // Counts along the chain never exceeded the cap
    let all_completed = w.store.query("blog", JobStatus::Completed);
    assert!(all_completed
        .iter()
        .all(|j| j.auto_continue_count <= MAX_AUTO_CONTINUES));
}

#[tokio::test]
async fn low_confidence_never_continues_silently() {
    let w = world("blog");
    w.store
        .enqueue(incoming("blog", "sess-1", "check the deploy"))
        .unwrap();

    // The classifier hedges a status guess below the floor
    w.classifier.push(
        valor_core::ClassificationResult::new(OutputKind::Status, 0.6, "probably progress")
            .with_coaching("be concrete"),
    );
    w.engine.push_text("Hmm, the deploy might be fine");

    assert_eq!(w.drain().await, 1);

    // Resolved to question: shown to the human, no continuation
    assert_eq!(w.transport.texts(), vec!["Hmm, the deploy might be fine"]);
    assert!(w.store.query("blog", JobStatus::Pending).is_empty());
}

#[tokio::test]
async fn classifier_outage_defers_to_the_human() {
    let w = world("blog");
    w.store
        .enqueue(incoming("blog", "sess-1", "plan the rollout"))
        .unwrap();

    w.classifier.push_error(
        valor_adapters::classify::ClassifyError::Unavailable("llm down".into()),
    );
    w.engine.push_text("Ready to build when approved");

    assert_eq!(w.drain().await, 1);

    // The heuristic treats the approval gate as a question
    assert_eq!(w.transport.texts(), vec!["Ready to build when approved"]);
    assert!(w.store.query("blog", JobStatus::Pending).is_empty());
}
