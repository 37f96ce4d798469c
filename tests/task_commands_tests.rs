//! Integration suite for the operator-facing task command surface and the
//! attention listing.

mod common;

use std::sync::Arc;

use chrono::Duration;
use uuid::Uuid;

use beacon_core::error::EngineError;
use beacon_core::models::{NewTask, NotificationKind, TaskCategory, TaskType};
use beacon_core::services::{list_attention_tasks, TaskCommands, Urgency};
use beacon_core::state_machine::{SnoozeValidation, TaskStatus};
use beacon_core::store::{MemoryStore, StoreGateway};
use beacon_core::test_helpers::{RecordingSink, TaskBuilder};

use common::day;

fn setup() -> (Arc<MemoryStore>, Arc<RecordingSink>, TaskCommands) {
    let store = Arc::new(MemoryStore::new());
    let sink = Arc::new(RecordingSink::new());
    let commands = TaskCommands::new(store.clone(), sink.clone());
    (store, sink, commands)
}

fn new_task() -> NewTask {
    NewTask {
        account_id: Uuid::new_v4(),
        assignee: "csm-1".to_string(),
        created_by: "system".to_string(),
        task_type: TaskType::Renewal,
        category: TaskCategory::Generated,
        title: "Renewal prep".to_string(),
        due_date: None,
    }
}

#[tokio::test]
async fn test_repeated_snoozes_cannot_outlive_the_window() {
    let (_store, _sink, commands) = setup();
    let task = commands.create(new_task(), day(0)).await.unwrap();

    // First snooze on day 0 to day 3 establishes the day-7 cap.
    let snoozed = commands.snooze(task.id, day(3), day(0)).await.unwrap();
    assert_eq!(snoozed.status, TaskStatus::Snoozed);
    assert_eq!(snoozed.max_snooze_date, Some(day(7)));

    commands.resurface(task.id, day(3)).await.unwrap();

    // Day 3, requesting day 9: past the cap, four whole days remain.
    let validation = commands.validate_snooze(task.id, day(9), day(3)).await.unwrap();
    match validation {
        SnoozeValidation::Rejected {
            days_remaining,
            max_snooze_date,
            ..
        } => {
            assert_eq!(days_remaining, 4);
            assert_eq!(max_snooze_date, day(7));
        }
        SnoozeValidation::Accepted { .. } => panic!("expected rejection"),
    }
    let err = commands.snooze(task.id, day(9), day(3)).await.unwrap_err();
    assert!(matches!(err, EngineError::PolicyViolation(_)));

    // A wake date inside the window is still fine, and the anchors hold.
    let snoozed = commands.snooze(task.id, day(6), day(3)).await.unwrap();
    assert_eq!(snoozed.first_snoozed_at, Some(day(0)));
    assert_eq!(snoozed.max_snooze_date, Some(day(7)));
    assert_eq!(snoozed.snooze_count, 2);
}

#[tokio::test]
async fn test_unknown_task_is_not_found() {
    let (_store, _sink, commands) = setup();
    let err = commands.snooze(Uuid::new_v4(), day(1), day(0)).await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound { .. }));
}

#[tokio::test]
async fn test_complete_records_timestamp_and_transition() {
    let (store, _sink, commands) = setup();
    let task = commands.create(new_task(), day(0)).await.unwrap();
    commands.start(task.id, day(1)).await.unwrap();
    let completed = commands.complete(task.id, day(2)).await.unwrap();

    assert_eq!(completed.status, TaskStatus::Completed);
    assert_eq!(completed.completed_at, Some(day(2)));

    let transitions = store.task_transitions(task.id);
    assert_eq!(transitions.len(), 2);
    assert_eq!(transitions[0].event, "task.started");
    assert_eq!(transitions[1].event, "task.completed");
    assert_eq!(transitions[1].from_status, TaskStatus::InProgress);
    assert_eq!(transitions[1].to_status, TaskStatus::Completed);

    // Terminal means terminal: nothing further is legal.
    let err = commands.start(task.id, day(3)).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransition { .. }));
}

#[tokio::test]
async fn test_reassign_notifies_new_assignee_and_keeps_policy_fields() {
    let (_store, sink, commands) = setup();
    let task = commands.create(new_task(), day(0)).await.unwrap();
    commands.snooze(task.id, day(3), day(0)).await.unwrap();
    commands.resurface(task.id, day(3)).await.unwrap();

    let reassigned = commands
        .reassign(task.id, "csm-2", "coverage change", day(4))
        .await
        .unwrap();
    assert_eq!(reassigned.status, TaskStatus::Reassigned);
    assert_eq!(reassigned.assignee, "csm-2");
    assert_eq!(reassigned.reassigned_from.as_deref(), Some("csm-1"));
    // The deferral window survives reassignment.
    assert_eq!(reassigned.max_snooze_date, Some(day(7)));
    assert_eq!(reassigned.snooze_count, 1);

    let sent = sink.sent_of_kind(NotificationKind::TaskReassigned);
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].user_id, "csm-2");
}

#[tokio::test]
async fn test_skip_requires_reason_and_is_terminal() {
    let (_store, _sink, commands) = setup();
    let task = commands.create(new_task(), day(0)).await.unwrap();
    let skipped = commands.skip(task.id, "no longer relevant", day(1)).await.unwrap();
    assert_eq!(skipped.status, TaskStatus::Skipped);
    assert_eq!(skipped.skip_reason.as_deref(), Some("no longer relevant"));
    assert_eq!(skipped.skipped_at, Some(day(1)));
}

#[tokio::test]
async fn test_surfaced_in_workflows_deduplicates_across_calls() {
    let (_store, _sink, commands) = setup();
    let task = commands.create(new_task(), day(0)).await.unwrap();
    let execution_id = Uuid::new_v4();

    let first = commands
        .record_surfaced_in(task.id, execution_id, day(1))
        .await
        .unwrap();
    assert_eq!(first.surfaced_in_workflows, vec![execution_id]);

    let second = commands
        .record_surfaced_in(task.id, execution_id, day(2))
        .await
        .unwrap();
    assert_eq!(second.surfaced_in_workflows, vec![execution_id]);
    // The no-op append leaves the record untouched.
    assert_eq!(second.updated_at, first.updated_at);
}

#[tokio::test]
async fn test_attention_listing_buckets_by_deadline() {
    let (store, _sink, _commands) = setup();
    let now = day(0);

    let overdue = TaskBuilder::new(day(-10)).title("Overdue").due(day(-2)).build();
    let critical = TaskBuilder::new(day(-10)).title("Due today").due(now + Duration::hours(6)).build();
    let urgent = TaskBuilder::new(day(-10)).title("Due soon").due(day(2)).build();
    let upcoming = TaskBuilder::new(day(-10)).title("Next week").due(day(6)).build();
    let far_out = TaskBuilder::new(day(-10)).title("Far out").due(day(30)).build();
    let undated = TaskBuilder::new(day(-10)).title("No deadline").build();
    for task in [&overdue, &critical, &urgent, &upcoming, &far_out, &undated] {
        store.insert_task(task).await.unwrap();
    }

    let list = list_attention_tasks(store.as_ref(), now, true).await.unwrap();
    assert_eq!(list.total(), 4);
    assert_eq!(list.overdue[0].title, "Overdue");
    assert_eq!(list.overdue[0].urgency, Urgency::Overdue);
    assert_eq!(list.critical[0].title, "Due today");
    assert_eq!(list.urgent[0].title, "Due soon");
    assert_eq!(list.upcoming[0].title, "Next week");
    assert!(list.needs_immediate_attention());
    assert_eq!(list.headlines().len(), 3);

    let without_upcoming = list_attention_tasks(store.as_ref(), now, false).await.unwrap();
    assert_eq!(without_upcoming.total(), 3);
    assert!(without_upcoming.upcoming.is_empty());
}

#[tokio::test]
async fn test_attention_listing_excludes_snoozed_and_terminal_tasks() {
    let (store, sink, commands) = setup();
    let _ = sink;
    let now = day(0);

    let snoozed = commands
        .create(
            NewTask {
                due_date: Some(day(1)),
                ..new_task()
            },
            day(-1),
        )
        .await
        .unwrap();
    commands.snooze(snoozed.id, day(2), day(-1)).await.unwrap();

    let done = commands
        .create(
            NewTask {
                due_date: Some(day(-1)),
                ..new_task()
            },
            day(-5),
        )
        .await
        .unwrap();
    commands.complete(done.id, day(-1)).await.unwrap();

    let list = list_attention_tasks(store.as_ref(), now, true).await.unwrap();
    assert_eq!(list.total(), 0);
}
