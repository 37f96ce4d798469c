//! Shared fixtures for the integration suites: a fixed timeline helper and a
//! failure-injecting store wrapper for partial-failure scenarios.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use beacon_core::error::{EngineError, EngineResult};
use beacon_core::models::{
    DomainEvent, EventType, NewTriggerEvaluation, Notification, Task, TaskTransition, TaskType,
    TaskTypePolicy, TriggerEvaluationLog, WorkflowExecution,
};
use beacon_core::store::StoreGateway;

/// A fixed instant plus whole-day offsets, the timeline used across suites.
pub fn day(n: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, 1, 9, 0, 0).unwrap() + Duration::days(n)
}

/// Gateway wrapper that fails `update_task` for poisoned task ids, leaving
/// every other operation untouched. Exercises the batch contract: one
/// candidate's store failure never aborts the others.
pub struct FlakyStore {
    inner: Arc<dyn StoreGateway>,
    poisoned: Mutex<HashSet<Uuid>>,
}

impl FlakyStore {
    pub fn new(inner: Arc<dyn StoreGateway>) -> Self {
        Self {
            inner,
            poisoned: Mutex::new(HashSet::new()),
        }
    }

    pub fn poison(&self, task_id: Uuid) {
        self.poisoned.lock().insert(task_id);
    }

    pub fn heal(&self, task_id: Uuid) {
        self.poisoned.lock().remove(&task_id);
    }
}

#[async_trait]
impl StoreGateway for FlakyStore {
    async fn insert_task(&self, task: &Task) -> EngineResult<()> {
        self.inner.insert_task(task).await
    }

    async fn get_task(&self, id: Uuid) -> EngineResult<Option<Task>> {
        self.inner.get_task(id).await
    }

    async fn update_task(&self, task: &Task) -> EngineResult<()> {
        if self.poisoned.lock().contains(&task.id) {
            return Err(EngineError::DependencyUnavailable(
                "injected write failure".to_string(),
            ));
        }
        self.inner.update_task(task).await
    }

    async fn tasks_due_for_resurface(&self, now: DateTime<Utc>) -> EngineResult<Vec<Task>> {
        self.inner.tasks_due_for_resurface(now).await
    }

    async fn tasks_past_snooze_deadline(&self, now: DateTime<Utc>) -> EngineResult<Vec<Task>> {
        self.inner.tasks_past_snooze_deadline(now).await
    }

    async fn tasks_due_for_auto_skip(&self, now: DateTime<Utc>) -> EngineResult<Vec<Task>> {
        self.inner.tasks_due_for_auto_skip(now).await
    }

    async fn live_tasks(&self) -> EngineResult<Vec<Task>> {
        self.inner.live_tasks().await
    }

    async fn append_task_transition(&self, transition: &TaskTransition) -> EngineResult<()> {
        self.inner.append_task_transition(transition).await
    }

    async fn get_policy(&self, task_type: TaskType) -> EngineResult<TaskTypePolicy> {
        self.inner.get_policy(task_type).await
    }

    async fn upsert_policy(&self, policy: &TaskTypePolicy) -> EngineResult<()> {
        self.inner.upsert_policy(policy).await
    }

    async fn insert_execution(&self, execution: &WorkflowExecution) -> EngineResult<()> {
        self.inner.insert_execution(execution).await
    }

    async fn get_execution(&self, id: Uuid) -> EngineResult<Option<WorkflowExecution>> {
        self.inner.get_execution(id).await
    }

    async fn update_execution(&self, execution: &WorkflowExecution) -> EngineResult<()> {
        self.inner.update_execution(execution).await
    }

    async fn snoozed_executions(&self) -> EngineResult<Vec<WorkflowExecution>> {
        self.inner.snoozed_executions().await
    }

    async fn mark_trigger_fired(
        &self,
        trigger_id: Uuid,
        fired_at: DateTime<Utc>,
    ) -> EngineResult<()> {
        self.inner.mark_trigger_fired(trigger_id, fired_at).await
    }

    async fn append_trigger_evaluation(
        &self,
        entry: NewTriggerEvaluation,
    ) -> EngineResult<TriggerEvaluationLog> {
        self.inner.append_trigger_evaluation(entry).await
    }

    async fn trigger_evaluations(
        &self,
        trigger_id: Uuid,
    ) -> EngineResult<Vec<TriggerEvaluationLog>> {
        self.inner.trigger_evaluations(trigger_id).await
    }

    async fn insert_event(&self, event: &DomainEvent) -> EngineResult<()> {
        self.inner.insert_event(event).await
    }

    async fn events_since(
        &self,
        event_type: EventType,
        since: DateTime<Utc>,
    ) -> EngineResult<Vec<DomainEvent>> {
        self.inner.events_since(event_type, since).await
    }

    async fn insert_notification(&self, notification: &Notification) -> EngineResult<()> {
        self.inner.insert_notification(notification).await
    }

    async fn list_notifications(&self) -> EngineResult<Vec<Notification>> {
        self.inner.list_notifications().await
    }

    async fn delete_notifications_before(&self, cutoff: DateTime<Utc>) -> EngineResult<u64> {
        self.inner.delete_notifications_before(cutoff).await
    }

    async fn find_manager(&self, assignee: &str) -> EngineResult<Option<String>> {
        self.inner.find_manager(assignee).await
    }

    async fn account_name(&self, account_id: Uuid) -> EngineResult<Option<String>> {
        self.inner.account_name(account_id).await
    }
}
