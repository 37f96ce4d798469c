//! Integration suite for the wake-trigger pass over snoozed workflow
//! executions: OR/AND combination, cumulative firing across passes, audit
//! logging, and the manual wake override.

mod common;

use std::sync::Arc;

use chrono::Duration;
use uuid::Uuid;

use beacon_core::error::EngineError;
use beacon_core::models::{DomainEvent, EventType, NotificationKind, TriggerKind, TriggerLogic};
use beacon_core::orchestration::EvaluationOrchestrator;
use beacon_core::services::WorkflowCommands;
use beacon_core::state_machine::WorkflowStatus;
use beacon_core::store::{MemoryStore, StoreGateway};
use beacon_core::test_helpers::{
    date_trigger_config, event_trigger_config, ExecutionBuilder, RecordingSink, StaticEventSource,
};

use common::day;

fn setup() -> (
    Arc<MemoryStore>,
    Arc<RecordingSink>,
    Arc<StaticEventSource>,
    EvaluationOrchestrator,
) {
    let store = Arc::new(MemoryStore::new());
    let sink = Arc::new(RecordingSink::new());
    let events = Arc::new(StaticEventSource::new());
    let orchestrator =
        EvaluationOrchestrator::new(store.clone(), sink.clone()).with_event_source(events.clone());
    (store, sink, events, orchestrator)
}

#[tokio::test]
async fn test_or_logic_wakes_on_due_date_trigger() {
    let (store, sink, _events, orchestrator) = setup();
    let execution = ExecutionBuilder::new(day(0)).owner("csm-2").build_snoozed(
        vec![
            date_trigger_config(day(2)),
            event_trigger_config(EventType::CustomerLogin, serde_json::json!({})),
        ],
        TriggerLogic::Or,
        day(0),
    );
    store.insert_execution(&execution).await.unwrap();

    let result = orchestrator.run_wake_evaluation(day(2)).await;
    assert_eq!(result.evaluated, 1);
    assert_eq!(result.woken, 1);
    assert_eq!(result.still_snoozed, 0);
    assert!(result.errors.is_empty());

    let woken = store.get_execution(execution.id).await.unwrap().unwrap();
    assert_eq!(woken.status, WorkflowStatus::InProgress);
    assert_eq!(woken.trigger_fired_at, Some(day(2)));
    assert_eq!(woken.fired_trigger_type, Some(TriggerKind::Date));
    assert!(woken.wake_triggers.is_empty());

    let sent = sink.sent_of_kind(NotificationKind::WorkflowWoken);
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].user_id, "csm-2");
}

#[tokio::test]
async fn test_or_logic_wakes_on_matching_event() {
    let (store, _sink, events, orchestrator) = setup();
    let execution = ExecutionBuilder::new(day(0)).build_snoozed(
        vec![event_trigger_config(
            EventType::CustomerLogin,
            serde_json::json!({"user": "u-1"}),
        )],
        TriggerLogic::Or,
        day(0),
    );
    store.insert_execution(&execution).await.unwrap();

    // An event before the snooze began never matches.
    events.push(DomainEvent::new(
        EventType::CustomerLogin,
        None,
        serde_json::json!({"user": "u-1"}),
        day(-1),
    ));
    let result = orchestrator.run_wake_evaluation(day(1)).await;
    assert_eq!(result.woken, 0);
    assert_eq!(result.still_snoozed, 1);

    events.push(DomainEvent::new(
        EventType::CustomerLogin,
        None,
        serde_json::json!({"user": "u-1", "source": "web"}),
        day(1),
    ));
    let result = orchestrator.run_wake_evaluation(day(2)).await;
    assert_eq!(result.woken, 1);

    let woken = store.get_execution(execution.id).await.unwrap().unwrap();
    assert_eq!(woken.fired_trigger_type, Some(TriggerKind::Event));
}

#[tokio::test]
async fn test_and_logic_requires_all_triggers_across_passes() {
    let (store, _sink, events, orchestrator) = setup();
    let execution = ExecutionBuilder::new(day(0)).build_snoozed(
        vec![
            date_trigger_config(day(1)),
            event_trigger_config(EventType::WorkflowActionCompleted, serde_json::json!({})),
        ],
        TriggerLogic::And,
        day(0),
    );
    store.insert_execution(&execution).await.unwrap();

    // Pass 1: the date trigger fires, the event trigger does not. No wake.
    let pass1 = orchestrator.run_wake_evaluation(day(1)).await;
    assert_eq!(pass1.woken, 0);
    assert_eq!(pass1.still_snoozed, 1);

    let after_pass1 = store.get_execution(execution.id).await.unwrap().unwrap();
    assert_eq!(after_pass1.status, WorkflowStatus::Snoozed);
    assert_eq!(after_pass1.last_evaluated_at, Some(day(1)));
    let fired: Vec<bool> = after_pass1
        .wake_triggers
        .iter()
        .map(|t| t.has_fired())
        .collect();
    assert_eq!(fired, vec![true, false]);

    // Pass 2: the event arrives; the date trigger is remembered as fired.
    events.push(DomainEvent::new(
        EventType::WorkflowActionCompleted,
        None,
        serde_json::json!({"action": "kickoff"}),
        day(2),
    ));
    let pass2 = orchestrator.run_wake_evaluation(day(3)).await;
    assert_eq!(pass2.woken, 1);

    let woken = store.get_execution(execution.id).await.unwrap().unwrap();
    assert_eq!(woken.status, WorkflowStatus::InProgress);
    assert_eq!(woken.trigger_fired_at, Some(day(3)));
}

#[tokio::test]
async fn test_non_firing_pass_still_stamps_last_evaluated_at() {
    let (store, _sink, _events, orchestrator) = setup();
    let execution = ExecutionBuilder::new(day(0)).build_snoozed(
        vec![date_trigger_config(day(10))],
        TriggerLogic::Or,
        day(0),
    );
    store.insert_execution(&execution).await.unwrap();

    orchestrator.run_wake_evaluation(day(1)).await;
    let after = store.get_execution(execution.id).await.unwrap().unwrap();
    assert_eq!(after.last_evaluated_at, Some(day(1)));
    assert_eq!(after.status, WorkflowStatus::Snoozed);

    orchestrator.run_wake_evaluation(day(2)).await;
    let after = store.get_execution(execution.id).await.unwrap().unwrap();
    assert_eq!(after.last_evaluated_at, Some(day(2)));
}

#[tokio::test]
async fn test_every_evaluation_is_audited() {
    let (store, _sink, _events, orchestrator) = setup();
    let execution = ExecutionBuilder::new(day(0)).build_snoozed(
        vec![date_trigger_config(day(3))],
        TriggerLogic::Or,
        day(0),
    );
    store.insert_execution(&execution).await.unwrap();
    let trigger_id = execution.wake_triggers[0].id;

    orchestrator.run_wake_evaluation(day(1)).await;
    orchestrator.run_wake_evaluation(day(2)).await;
    orchestrator.run_wake_evaluation(day(3)).await;

    let log = store.trigger_evaluations(trigger_id).await.unwrap();
    assert_eq!(log.len(), 3);
    assert_eq!(
        log.iter().map(|l| l.evaluation_count).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert_eq!(
        log.iter().map(|l| l.fired).collect::<Vec<_>>(),
        vec![false, false, true]
    );
    assert_eq!(log[2].fired_at, Some(day(3)));
}

#[tokio::test]
async fn test_wake_now_bypasses_triggers_and_records_reason() {
    let (store, sink, _events, orchestrator) = setup();
    let commands = WorkflowCommands::new(store.clone(), sink.clone());
    let execution = ExecutionBuilder::new(day(0)).owner("csm-3").build_snoozed(
        vec![date_trigger_config(day(30))],
        TriggerLogic::Or,
        day(0),
    );
    store.insert_execution(&execution).await.unwrap();

    let woken = commands
        .wake_now(execution.id, "customer called in", day(1))
        .await
        .unwrap();
    assert_eq!(woken.status, WorkflowStatus::InProgress);
    assert_eq!(woken.wake_reason.as_deref(), Some("customer called in"));
    assert_eq!(woken.fired_trigger_type, None);
    assert!(woken.wake_triggers.is_empty());

    let sent = sink.sent_of_kind(NotificationKind::WorkflowWoken);
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].payload["manual"], serde_json::json!(true));

    // The next batch pass has nothing left to evaluate.
    let result = orchestrator.run_wake_evaluation(day(2)).await;
    assert_eq!(result.evaluated, 0);
}

#[tokio::test]
async fn test_wake_now_on_active_execution_is_invalid() {
    let (store, sink, _events, _orchestrator) = setup();
    let commands = WorkflowCommands::new(store.clone(), sink);
    let execution = ExecutionBuilder::new(day(0)).build();
    store.insert_execution(&execution).await.unwrap();

    let err = commands
        .wake_now(execution.id, "nothing to wake", day(1))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransition { .. }));
}

#[tokio::test]
async fn test_wake_now_unknown_execution_is_not_found() {
    let (store, sink, _events, _orchestrator) = setup();
    let commands = WorkflowCommands::new(store, sink);
    let err = commands
        .wake_now(Uuid::new_v4(), "ghost", day(0))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound { .. }));
}

#[tokio::test]
async fn test_snoozing_requires_at_least_one_trigger() {
    let (store, sink, _events, _orchestrator) = setup();
    let commands = WorkflowCommands::new(store.clone(), sink);
    let execution = commands
        .create(Uuid::new_v4(), "qbr_prep", "csm-1", day(0))
        .await
        .unwrap();

    let err = commands
        .snooze(execution.id, vec![], TriggerLogic::Or, day(0))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::PolicyViolation(_)));

    let snoozed = commands
        .snooze(
            execution.id,
            vec![date_trigger_config(day(5))],
            TriggerLogic::Or,
            day(0),
        )
        .await
        .unwrap();
    assert_eq!(snoozed.status, WorkflowStatus::Snoozed);
    assert_eq!(snoozed.wake_triggers.len(), 1);

    // Snoozing an already-snoozed execution is a caller mistake; a new
    // deferral starts by waking first.
    let err = commands
        .snooze(
            execution.id,
            vec![date_trigger_config(day(6))],
            TriggerLogic::Or,
            day(1),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransition { .. }));
}
