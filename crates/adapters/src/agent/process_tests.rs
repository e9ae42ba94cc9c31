// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tokio::sync::mpsc;
use valor_core::SessionId;

fn request(prompt: &str, dir: &std::path::Path) -> SessionRequest {
    SessionRequest {
        session_id: SessionId::new("sess-1"),
        prompt: prompt.to_string(),
        working_dir: dir.to_path_buf(),
        resume: false,
    }
}

#[tokio::test]
async fn echo_engine_streams_output_and_pings() {
    let dir = tempfile::tempdir().unwrap();
    let engine = ProcessSessionEngine::new(ProcessEngineConfig::new("echo"));
    let (tx, mut rx) = mpsc::channel(16);

    let output = engine.run(request("hello world", dir.path()), tx).await.unwrap();

    // echo prints its arguments, session flags included
    assert!(output.text.contains("hello world"));
    assert!(output.text.contains("--session-id sess-1"));
    assert!(rx.recv().await.is_some());
}

#[tokio::test]
async fn resume_uses_resume_flag() {
    let dir = tempfile::tempdir().unwrap();
    let engine = ProcessSessionEngine::new(ProcessEngineConfig::new("echo"));
    let (tx, _rx) = mpsc::channel(16);

    let mut req = request("continue", dir.path());
    req.resume = true;
    let output = engine.run(req, tx).await.unwrap();

    assert!(output.text.contains("--resume sess-1"));
    assert!(!output.text.contains("--session-id"));
}

#[tokio::test]
async fn nonzero_exit_is_an_engine_error() {
    let dir = tempfile::tempdir().unwrap();
    let engine = ProcessSessionEngine::new(ProcessEngineConfig::new("false"));
    let (tx, _rx) = mpsc::channel(16);

    let result = engine.run(request("anything", dir.path()), tx).await;
    assert!(matches!(result, Err(EngineError::Exited { .. })));
}

#[tokio::test]
async fn missing_binary_is_spawn_failed() {
    let dir = tempfile::tempdir().unwrap();
    let engine = ProcessSessionEngine::new(ProcessEngineConfig::new(
        "/nonexistent/agent-binary",
    ));
    let (tx, _rx) = mpsc::channel(16);

    let result = engine.run(request("anything", dir.path()), tx).await;
    assert!(matches!(result, Err(EngineError::SpawnFailed(_))));
}

#[test]
fn cost_line_is_lifted_out_of_text() {
    let text = "All done.\n{\"total_cost_usd\":0.42}".to_string();
    let (stripped, cost) = split_cost_line(text);
    assert_eq!(stripped, "All done.");
    assert_eq!(cost, Some(0.42));
}

#[test]
fn plain_text_has_no_cost() {
    let (text, cost) = split_cost_line("just words".to_string());
    assert_eq!(text, "just words");
    assert_eq!(cost, None);
}

#[test]
fn trailing_json_without_cost_is_kept() {
    let text = "done\n{\"unrelated\":true}".to_string();
    let (kept, cost) = split_cost_line(text);
    assert_eq!(kept, "done\n{\"unrelated\":true}");
    assert_eq!(cost, None);
}

#[test]
fn tail_respects_char_boundaries() {
    let s = "héllo wörld";
    let t = tail(s, 4);
    assert!(s.ends_with(&t));
}
