//! # Task Command Surface
//!
//! Synchronous operator-facing entry points over the task state machine.
//! Unlike the batch passes, dependency failures here propagate to the caller
//! so the operation can be retried; policy violations and illegal transitions
//! come back as typed errors with an explanatory message.

use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::logging::log_task_operation;
use crate::models::{NewTask, NotificationKind, Task, TaskTransition};
use crate::notifications::{notify_best_effort, NotificationSink};
use crate::state_machine::{transitions, SnoozePolicy, SnoozeValidation};
use crate::store::StoreGateway;

pub struct TaskCommands {
    store: Arc<dyn StoreGateway>,
    sink: Arc<dyn NotificationSink>,
    policy: SnoozePolicy,
}

impl TaskCommands {
    pub fn new(store: Arc<dyn StoreGateway>, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            store,
            sink,
            policy: SnoozePolicy::default(),
        }
    }

    pub fn with_snooze_policy(mut self, policy: SnoozePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub async fn create(&self, new_task: NewTask, now: DateTime<Utc>) -> EngineResult<Task> {
        let task = Task::from_new(new_task, now);
        self.store.insert_task(&task).await?;
        log_task_operation("create", task.id, &task.status.to_string(), None);
        Ok(task)
    }

    pub async fn get(&self, task_id: Uuid) -> EngineResult<Task> {
        self.load(task_id).await
    }

    /// Preview whether a snooze request would be accepted, without applying
    /// it. `snooze` re-validates regardless, so skipping this check is safe.
    pub async fn validate_snooze(
        &self,
        task_id: Uuid,
        requested_wake: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> EngineResult<SnoozeValidation> {
        let task = self.load(task_id).await?;
        Ok(self.policy.validate(&task, requested_wake, now))
    }

    pub async fn snooze(
        &self,
        task_id: Uuid,
        requested_wake: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> EngineResult<Task> {
        let mut task = self.load(task_id).await?;
        let transition = transitions::snooze(&mut task, &self.policy, requested_wake, now)?;
        self.persist(&task, &transition).await?;
        Ok(task)
    }

    pub async fn start(&self, task_id: Uuid, now: DateTime<Utc>) -> EngineResult<Task> {
        let mut task = self.load(task_id).await?;
        let transition = transitions::start(&mut task, now)?;
        self.persist(&task, &transition).await?;
        Ok(task)
    }

    /// Manually return a snoozed task to the queue before its wake time.
    pub async fn resurface(&self, task_id: Uuid, now: DateTime<Utc>) -> EngineResult<Task> {
        let mut task = self.load(task_id).await?;
        let transition = transitions::resurface(&mut task, now)?;
        self.persist(&task, &transition).await?;
        Ok(task)
    }

    pub async fn complete(&self, task_id: Uuid, now: DateTime<Utc>) -> EngineResult<Task> {
        let mut task = self.load(task_id).await?;
        let transition = transitions::complete(&mut task, now)?;
        self.persist(&task, &transition).await?;
        Ok(task)
    }

    pub async fn skip(
        &self,
        task_id: Uuid,
        reason: impl Into<String>,
        now: DateTime<Utc>,
    ) -> EngineResult<Task> {
        let mut task = self.load(task_id).await?;
        let transition = transitions::skip(&mut task, reason.into(), now)?;
        self.persist(&task, &transition).await?;
        Ok(task)
    }

    /// Hand the task to a new assignee and notify them. The previous assignee
    /// is recorded on the task; policy fields carry over untouched.
    pub async fn reassign(
        &self,
        task_id: Uuid,
        new_assignee: impl Into<String>,
        reason: impl Into<String>,
        now: DateTime<Utc>,
    ) -> EngineResult<Task> {
        let new_assignee = new_assignee.into();
        let reason = reason.into();
        let mut task = self.load(task_id).await?;
        let transition =
            transitions::reassign(&mut task, new_assignee.clone(), reason.clone(), now)?;
        self.persist(&task, &transition).await?;

        notify_best_effort(
            self.sink.as_ref(),
            &new_assignee,
            NotificationKind::TaskReassigned,
            json!({
                "task_id": task.id,
                "title": task.title,
                "previous_assignee": task.reassigned_from,
                "reason": reason,
            }),
            now,
        )
        .await;
        Ok(task)
    }

    /// Cross-reference the task from a parent workflow execution. Appending
    /// an already-present reference is a no-op, not an error.
    pub async fn record_surfaced_in(
        &self,
        task_id: Uuid,
        execution_id: Uuid,
        now: DateTime<Utc>,
    ) -> EngineResult<Task> {
        let mut task = self.load(task_id).await?;
        if task.record_surfaced_in(execution_id) {
            task.updated_at = now;
            self.store.update_task(&task).await?;
        }
        Ok(task)
    }

    async fn load(&self, task_id: Uuid) -> EngineResult<Task> {
        self.store
            .get_task(task_id)
            .await?
            .ok_or(EngineError::not_found("task", task_id))
    }

    async fn persist(&self, task: &Task, transition: &TaskTransition) -> EngineResult<()> {
        self.store.update_task(task).await?;
        self.store.append_task_transition(transition).await?;
        log_task_operation(
            &transition.event,
            task.id,
            &task.status.to_string(),
            transition.detail.as_deref(),
        );
        Ok(())
    }
}
