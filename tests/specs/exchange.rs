// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One logical exchange always ends in exactly one of: an answer, an
//! error message, or a question — never nothing, and never a success
//! signal without content.

use crate::prelude::*;
use valor_core::{DeliveryState, JobStatus, OutputKind, Reaction};

#[tokio::test]
async fn answer_reaches_the_user_with_a_success_reaction() {
    let w = world("home-automation");
    w.classifier.push_kind(OutputKind::Completion);
    w.engine.push_text("Scene created: movie night dims the lights to 20%.");
    w.store
        .enqueue(incoming("home-automation", "sess-1", "add a movie night scene"))
        .unwrap();

    assert_eq!(w.drain().await, 1);

    assert_eq!(
        w.transport.texts(),
        vec!["Scene created: movie night dims the lights to 20%."]
    );
    assert_eq!(w.transport.reactions(), vec![Reaction::Replied]);
    let job = &w.store.query("home-automation", JobStatus::Completed)[0];
    assert_eq!(job.delivery, DeliveryState::DeliveredReply);
}

#[tokio::test]
async fn question_is_always_shown_never_continued() {
    let w = world("home-automation");
    w.classifier.push_kind(OutputKind::Question);
    w.engine
        .push_text("Should the scene also close the blinds, or only dim lights?");
    w.store
        .enqueue(incoming("home-automation", "sess-1", "add a movie night scene"))
        .unwrap();

    assert_eq!(w.drain().await, 1);

    assert_eq!(w.transport.texts().len(), 1);
    assert!(w.store.query("home-automation", JobStatus::Pending).is_empty());
}

#[tokio::test]
async fn engine_timeout_yields_error_message_and_reaction() {
    let w = world("home-automation");
    w.engine.push_hang();
    w.store
        .enqueue(incoming("home-automation", "sess-1", "add a scene"))
        .unwrap();

    assert_eq!(w.drain().await, 1);

    let failed = w.store.query("home-automation", JobStatus::Failed);
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].delivery, DeliveryState::DeliveredError);
    assert_eq!(w.transport.reactions(), vec![Reaction::Error]);
    assert_eq!(w.transport.texts().len(), 1);
    // No continuation was attempted for an engine failure
    assert!(w.store.query("home-automation", JobStatus::Pending).is_empty());
}

#[tokio::test]
async fn tool_noise_only_output_still_delivers_something() {
    let w = world("home-automation");
    w.classifier.push_kind(OutputKind::Completion);
    w.engine.push_text("[tool] Edit scenes.yaml\n⏺ applied");
    w.store
        .enqueue(incoming("home-automation", "sess-1", "tweak the scene"))
        .unwrap();

    assert_eq!(w.drain().await, 1);

    // Raw output was non-empty, so a success signal alone would be a lie:
    // fallback text goes out with the reply reaction.
    let texts = w.transport.texts();
    assert_eq!(texts.len(), 1);
    assert!(!texts[0].trim().is_empty());
    assert_eq!(w.transport.reactions(), vec![Reaction::Replied]);
}

#[tokio::test]
async fn untexted_completion_is_acknowledged_not_silent() {
    let w = world("home-automation");
    w.classifier.push_kind(OutputKind::Completion);
    w.engine.push_text("");
    w.store
        .enqueue(incoming("home-automation", "sess-1", "poke the cron"))
        .unwrap();

    assert_eq!(w.drain().await, 1);

    assert!(w.transport.texts().is_empty());
    assert_eq!(w.transport.reactions(), vec![Reaction::Ack]);
    let job = &w.store.query("home-automation", JobStatus::Completed)[0];
    assert_eq!(job.delivery, DeliveryState::DeliveredAck);
}
