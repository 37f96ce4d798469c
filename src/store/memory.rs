//! In-process store gateway backed by parking_lot-guarded maps.
//!
//! Query predicates mirror the SQL in [`super::postgres`] exactly; the test
//! suite runs against this implementation, so the predicates are the
//! behavioral contract. No lock is held across an await point.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::EngineResult;
use crate::models::{
    DomainEvent, EventType, NewTriggerEvaluation, Notification, Task, TaskTransition, TaskType,
    TaskTypePolicy, TriggerEvaluationLog, WorkflowExecution,
};
use crate::state_machine::DeferredUnit;
use crate::store::StoreGateway;

#[derive(Default)]
struct Inner {
    tasks: HashMap<Uuid, Task>,
    policies: HashMap<TaskType, TaskTypePolicy>,
    executions: HashMap<Uuid, WorkflowExecution>,
    task_transitions: Vec<TaskTransition>,
    trigger_evaluations: Vec<TriggerEvaluationLog>,
    events: Vec<DomainEvent>,
    notifications: Vec<Notification>,
    managers: HashMap<String, String>,
    accounts: HashMap<Uuid, String>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a manager relationship for escalation lookups.
    pub fn set_manager(&self, assignee: impl Into<String>, manager: impl Into<String>) {
        self.inner.write().managers.insert(assignee.into(), manager.into());
    }

    /// Seed an account display name.
    pub fn set_account_name(&self, account_id: Uuid, name: impl Into<String>) {
        self.inner.write().accounts.insert(account_id, name.into());
    }

    pub fn task_transitions(&self, task_id: Uuid) -> Vec<TaskTransition> {
        self.inner
            .read()
            .task_transitions
            .iter()
            .filter(|t| t.task_id == task_id)
            .cloned()
            .collect()
    }
}

fn sorted_by_creation(mut tasks: Vec<Task>) -> Vec<Task> {
    tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    tasks
}

#[async_trait]
impl StoreGateway for MemoryStore {
    async fn insert_task(&self, task: &Task) -> EngineResult<()> {
        self.inner.write().tasks.insert(task.id, task.clone());
        Ok(())
    }

    async fn get_task(&self, id: Uuid) -> EngineResult<Option<Task>> {
        Ok(self.inner.read().tasks.get(&id).cloned())
    }

    async fn update_task(&self, task: &Task) -> EngineResult<()> {
        self.inner.write().tasks.insert(task.id, task.clone());
        Ok(())
    }

    async fn tasks_due_for_resurface(&self, now: DateTime<Utc>) -> EngineResult<Vec<Task>> {
        let inner = self.inner.read();
        Ok(sorted_by_creation(
            inner
                .tasks
                .values()
                .filter(|t| t.wake_due(now))
                .cloned()
                .collect(),
        ))
    }

    async fn tasks_past_snooze_deadline(&self, now: DateTime<Utc>) -> EngineResult<Vec<Task>> {
        let inner = self.inner.read();
        Ok(sorted_by_creation(
            inner
                .tasks
                .values()
                .filter(|t| {
                    !t.status.is_terminal()
                        && !t.force_action
                        && t.max_snooze_date.is_some_and(|max| now >= max)
                })
                .cloned()
                .collect(),
        ))
    }

    async fn tasks_due_for_auto_skip(&self, now: DateTime<Utc>) -> EngineResult<Vec<Task>> {
        let inner = self.inner.read();
        Ok(sorted_by_creation(
            inner
                .tasks
                .values()
                .filter(|t| {
                    !t.status.is_terminal()
                        && t.force_action
                        && t.auto_skip_at.is_some_and(|at| at <= now)
                })
                .cloned()
                .collect(),
        ))
    }

    async fn live_tasks(&self) -> EngineResult<Vec<Task>> {
        let inner = self.inner.read();
        Ok(sorted_by_creation(
            inner
                .tasks
                .values()
                .filter(|t| !t.status.is_terminal())
                .cloned()
                .collect(),
        ))
    }

    async fn append_task_transition(&self, transition: &TaskTransition) -> EngineResult<()> {
        self.inner.write().task_transitions.push(transition.clone());
        Ok(())
    }

    async fn get_policy(&self, task_type: TaskType) -> EngineResult<TaskTypePolicy> {
        Ok(self
            .inner
            .read()
            .policies
            .get(&task_type)
            .cloned()
            .unwrap_or_else(|| TaskTypePolicy::default_for(task_type)))
    }

    async fn upsert_policy(&self, policy: &TaskTypePolicy) -> EngineResult<()> {
        self.inner
            .write()
            .policies
            .insert(policy.task_type, policy.clone());
        Ok(())
    }

    async fn insert_execution(&self, execution: &WorkflowExecution) -> EngineResult<()> {
        self.inner
            .write()
            .executions
            .insert(execution.id, execution.clone());
        Ok(())
    }

    async fn get_execution(&self, id: Uuid) -> EngineResult<Option<WorkflowExecution>> {
        Ok(self.inner.read().executions.get(&id).cloned())
    }

    async fn update_execution(&self, execution: &WorkflowExecution) -> EngineResult<()> {
        self.inner
            .write()
            .executions
            .insert(execution.id, execution.clone());
        Ok(())
    }

    async fn snoozed_executions(&self) -> EngineResult<Vec<WorkflowExecution>> {
        let inner = self.inner.read();
        let mut executions: Vec<_> = inner
            .executions
            .values()
            .filter(|e| e.is_deferred())
            .cloned()
            .collect();
        executions.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(executions)
    }

    async fn mark_trigger_fired(
        &self,
        trigger_id: Uuid,
        fired_at: DateTime<Utc>,
    ) -> EngineResult<()> {
        let mut inner = self.inner.write();
        for execution in inner.executions.values_mut() {
            for trigger in execution.wake_triggers.iter_mut() {
                if trigger.id == trigger_id && trigger.first_fired_at.is_none() {
                    trigger.first_fired_at = Some(fired_at);
                }
            }
        }
        Ok(())
    }

    async fn append_trigger_evaluation(
        &self,
        entry: NewTriggerEvaluation,
    ) -> EngineResult<TriggerEvaluationLog> {
        let mut inner = self.inner.write();
        let evaluation_count = inner
            .trigger_evaluations
            .iter()
            .filter(|e| e.trigger_id == entry.trigger_id)
            .count() as i32
            + 1;
        let log = TriggerEvaluationLog {
            id: Uuid::new_v4(),
            trigger_id: entry.trigger_id,
            execution_id: entry.execution_id,
            fired: entry.fired,
            evaluation_count,
            fired_at: entry.fired_at,
            error: entry.error,
            evaluated_at: entry.evaluated_at,
        };
        inner.trigger_evaluations.push(log.clone());
        Ok(log)
    }

    async fn trigger_evaluations(
        &self,
        trigger_id: Uuid,
    ) -> EngineResult<Vec<TriggerEvaluationLog>> {
        Ok(self
            .inner
            .read()
            .trigger_evaluations
            .iter()
            .filter(|e| e.trigger_id == trigger_id)
            .cloned()
            .collect())
    }

    async fn insert_event(&self, event: &DomainEvent) -> EngineResult<()> {
        self.inner.write().events.push(event.clone());
        Ok(())
    }

    async fn events_since(
        &self,
        event_type: EventType,
        since: DateTime<Utc>,
    ) -> EngineResult<Vec<DomainEvent>> {
        Ok(self
            .inner
            .read()
            .events
            .iter()
            .filter(|e| e.event_type == event_type && e.occurred_at >= since)
            .cloned()
            .collect())
    }

    async fn insert_notification(&self, notification: &Notification) -> EngineResult<()> {
        self.inner.write().notifications.push(notification.clone());
        Ok(())
    }

    async fn list_notifications(&self) -> EngineResult<Vec<Notification>> {
        Ok(self.inner.read().notifications.clone())
    }

    async fn delete_notifications_before(&self, cutoff: DateTime<Utc>) -> EngineResult<u64> {
        let mut inner = self.inner.write();
        let before = inner.notifications.len();
        inner.notifications.retain(|n| n.created_at >= cutoff);
        Ok((before - inner.notifications.len()) as u64)
    }

    async fn find_manager(&self, assignee: &str) -> EngineResult<Option<String>> {
        Ok(self.inner.read().managers.get(assignee).cloned())
    }

    async fn account_name(&self, account_id: Uuid) -> EngineResult<Option<String>> {
        Ok(self.inner.read().accounts.get(&account_id).cloned())
    }
}
