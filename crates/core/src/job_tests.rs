// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn test_config() -> JobConfig {
    JobConfig::builder("home-automation", "sess-1")
        .working_dir("/srv/projects/home-automation")
        .message("add a scene for movie night")
        .sender("sam")
        .chat("chat-9", "msg-42")
        .build()
}

#[test]
fn job_creation_defaults() {
    let job = Job::new(JobId::new("job-1"), test_config(), 1_000);

    assert_eq!(job.status, JobStatus::Pending);
    assert_eq!(job.priority, 0);
    assert_eq!(job.created_at_ms, 1_000);
    assert_eq!(job.auto_continue_count, 0);
    assert!(job.started_at_ms.is_none());
    assert!(job.revival_context.is_none());
    assert!(job.worktree_dir.is_none());
    assert_eq!(job.delivery, DeliveryState::Received);
    assert!(!job.is_terminal());
}

#[test]
fn status_transitions_only_move_forward() {
    assert!(JobStatus::Pending.can_advance_to(JobStatus::Running));
    assert!(JobStatus::Running.can_advance_to(JobStatus::Completed));
    assert!(JobStatus::Running.can_advance_to(JobStatus::Failed));

    assert!(!JobStatus::Pending.can_advance_to(JobStatus::Completed));
    assert!(!JobStatus::Running.can_advance_to(JobStatus::Pending));
    assert!(!JobStatus::Completed.can_advance_to(JobStatus::Running));
    assert!(!JobStatus::Failed.can_advance_to(JobStatus::Pending));
    assert!(!JobStatus::Completed.can_advance_to(JobStatus::Failed));
}

#[test]
fn terminal_statuses() {
    assert!(!JobStatus::Pending.is_terminal());
    assert!(!JobStatus::Running.is_terminal());
    assert!(JobStatus::Completed.is_terminal());
    assert!(JobStatus::Failed.is_terminal());
}

#[test]
fn continuation_keeps_session_and_chat_identity() {
    let job = Job::new(JobId::new("job-1"), test_config(), 1_000);
    let next = job.continuation(Some("name the concrete scene entities you created"));

    assert_eq!(next.session_id, job.session_id);
    assert_eq!(next.chat_id, job.chat_id);
    assert_eq!(next.message_id, job.message_id);
    assert_eq!(next.project_key, job.project_key);
    assert_eq!(next.auto_continue_count, 1);
    assert_eq!(
        next.message_text,
        "name the concrete scene entities you created"
    );
}

#[test]
fn continuation_without_coaching_says_continue() {
    let job = Job::new(JobId::new("job-1"), test_config(), 1_000);
    assert_eq!(job.continuation(None).message_text, "continue");
}

#[test]
fn continuation_count_is_monotonic_along_chain() {
    let mut job = Job::new(JobId::new("job-1"), test_config(), 1_000);
    for expected in 1..=MAX_AUTO_CONTINUES {
        let next = job.continuation(None);
        assert_eq!(next.auto_continue_count, expected);
        job = Job::new(JobId::new(format!("job-{}", expected + 1)), next, 2_000);
    }
    assert!(job.continues_exhausted());
}

#[test]
fn fresh_job_does_not_resume_session() {
    let job = Job::new(JobId::new("job-1"), test_config(), 1_000);
    assert!(!job.resumes_session());
}

#[test]
fn continuation_job_resumes_session() {
    let first = Job::new(JobId::new("job-1"), test_config(), 1_000);
    let next = Job::new(JobId::new("job-2"), first.continuation(None), 2_000);
    assert!(next.resumes_session());
}

#[test]
fn revived_job_resumes_session() {
    let config = JobConfig::builder("home-automation", "sess-1")
        .working_dir("/srv/projects/home-automation")
        .message("add a scene for movie night")
        .sender("sam")
        .chat("chat-9", "msg-42")
        .revival_context("stale running job after restart")
        .build();
    let job = Job::new(JobId::new("job-2"), config, 2_000);
    assert!(job.resumes_session());
}

#[test]
fn job_serde_round_trip() {
    let mut job = Job::new(JobId::new("job-1"), test_config(), 1_000);
    job.status = JobStatus::Running;
    job.started_at_ms = Some(1_200);
    job.worktree_dir = Some("/srv/work/job-1".into());

    let json = serde_json::to_string(&job).expect("serialize job");
    let restored: Job = serde_json::from_str(&json).expect("deserialize job");
    assert_eq!(restored, job);
}

#[test]
fn job_deserializes_without_optional_fields() {
    // Records written before worktree assignment lack the optional fields
    let json = r#"{
        "id": "job-1",
        "project_key": "p",
        "status": "pending",
        "priority": 0,
        "created_at_ms": 5,
        "session_id": "s",
        "working_dir": "/tmp",
        "message_text": "hi",
        "sender_name": "sam",
        "chat_id": "c",
        "message_id": "m"
    }"#;
    let job: Job = serde_json::from_str(json).expect("deserialize");
    assert_eq!(job.auto_continue_count, 0);
    assert_eq!(job.delivery, DeliveryState::Received);
    assert!(job.chat_title.is_none());
}
