//! Builders and collaborator doubles shared by the unit and integration test
//! suites. Nothing here is used by production code paths.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::evaluator::EventSource;
use crate::models::{
    DomainEvent, EventType, NewTask, Notification, NotificationKind, Task, TaskCategory, TaskType,
    Trigger, TriggerConfig, TriggerLogic, WorkflowExecution,
};
use crate::notifications::NotificationSink;

pub struct TaskBuilder {
    new_task: NewTask,
    created_at: DateTime<Utc>,
}

impl TaskBuilder {
    pub fn new(created_at: DateTime<Utc>) -> Self {
        Self {
            new_task: NewTask {
                account_id: Uuid::new_v4(),
                assignee: "csm-1".to_string(),
                created_by: "system".to_string(),
                task_type: TaskType::Renewal,
                category: TaskCategory::Generated,
                title: "Renewal prep".to_string(),
                due_date: None,
            },
            created_at,
        }
    }

    pub fn assignee(mut self, assignee: impl Into<String>) -> Self {
        self.new_task.assignee = assignee.into();
        self
    }

    pub fn account(mut self, account_id: Uuid) -> Self {
        self.new_task.account_id = account_id;
        self
    }

    pub fn task_type(mut self, task_type: TaskType) -> Self {
        self.new_task.task_type = task_type;
        self
    }

    pub fn category(mut self, category: TaskCategory) -> Self {
        self.new_task.category = category;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.new_task.title = title.into();
        self
    }

    pub fn due(mut self, due_date: DateTime<Utc>) -> Self {
        self.new_task.due_date = Some(due_date);
        self
    }

    pub fn build(self) -> Task {
        Task::from_new(self.new_task, self.created_at)
    }
}

pub struct ExecutionBuilder {
    account_id: Uuid,
    workflow_name: String,
    owner: String,
    created_at: DateTime<Utc>,
}

impl ExecutionBuilder {
    pub fn new(created_at: DateTime<Utc>) -> Self {
        Self {
            account_id: Uuid::new_v4(),
            workflow_name: "renewal_play".to_string(),
            owner: "csm-1".to_string(),
            created_at,
        }
    }

    pub fn account(mut self, account_id: Uuid) -> Self {
        self.account_id = account_id;
        self
    }

    pub fn name(mut self, workflow_name: impl Into<String>) -> Self {
        self.workflow_name = workflow_name.into();
        self
    }

    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }

    pub fn build(self) -> WorkflowExecution {
        WorkflowExecution::new(self.account_id, self.workflow_name, self.owner, self.created_at)
    }

    /// Build the execution already deferred behind the given trigger configs.
    pub fn build_snoozed(
        self,
        configs: Vec<TriggerConfig>,
        logic: TriggerLogic,
        now: DateTime<Utc>,
    ) -> WorkflowExecution {
        let mut execution = self.build();
        let triggers = configs
            .into_iter()
            .enumerate()
            .map(|(position, config)| Trigger::new(execution.id, position as i32, config, now))
            .collect();
        execution.begin_deferral(triggers, logic, now);
        execution
    }
}

pub fn date_trigger_config(target: DateTime<Utc>) -> TriggerConfig {
    TriggerConfig::Date {
        target,
        timezone: None,
    }
}

pub fn event_trigger_config(event_type: EventType, params: serde_json::Value) -> TriggerConfig {
    TriggerConfig::Event { event_type, params }
}

/// Sink double that records every delivery in memory. Flip `fail` to make
/// deliveries error, exercising the swallow-and-log contract.
#[derive(Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<Notification>>,
    fail: AtomicBool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().clone()
    }

    pub fn sent_of_kind(&self, kind: NotificationKind) -> Vec<Notification> {
        self.sent
            .lock()
            .iter()
            .filter(|n| n.kind == kind)
            .cloned()
            .collect()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().len()
    }
}

#[async_trait::async_trait]
impl NotificationSink for RecordingSink {
    async fn notify(
        &self,
        user_id: &str,
        kind: NotificationKind,
        payload: serde_json::Value,
        now: DateTime<Utc>,
    ) -> EngineResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(EngineError::DependencyUnavailable(
                "notification channel down".to_string(),
            ));
        }
        self.sent
            .lock()
            .push(Notification::new(user_id, kind, payload, now));
        Ok(())
    }
}

/// Event source double fed from a fixed in-memory event list.
#[derive(Default)]
pub struct StaticEventSource {
    events: Mutex<Vec<DomainEvent>>,
}

impl StaticEventSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: DomainEvent) {
        self.events.lock().push(event);
    }
}

#[async_trait::async_trait]
impl EventSource for StaticEventSource {
    async fn events_since(
        &self,
        event_type: EventType,
        since: DateTime<Utc>,
    ) -> EngineResult<Vec<DomainEvent>> {
        Ok(self
            .events
            .lock()
            .iter()
            .filter(|e| e.event_type == event_type && e.occurred_at >= since)
            .cloned()
            .collect())
    }
}
