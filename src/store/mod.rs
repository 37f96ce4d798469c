//! # Store Gateway
//!
//! The engine's only path to persistence. The platform's relational store is
//! an external collaborator, so the engine programs against this trait:
//! record CRUD plus the four batch queries, each phrased to naturally exclude
//! already-processed candidates — that exclusion is what makes re-running a
//! pass idempotent. Writes are transactional per single record; the engine
//! never needs a multi-record transaction.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::EngineResult;
use crate::models::{
    DomainEvent, EventType, NewTriggerEvaluation, Notification, Task, TaskTransition, TaskType,
    TaskTypePolicy, TriggerEvaluationLog, WorkflowExecution,
};

#[async_trait]
pub trait StoreGateway: Send + Sync {
    // --- Tasks ---

    async fn insert_task(&self, task: &Task) -> EngineResult<()>;
    async fn get_task(&self, id: Uuid) -> EngineResult<Option<Task>>;
    async fn update_task(&self, task: &Task) -> EngineResult<()>;

    /// Snoozed tasks whose requested wake time has passed. Excludes anything
    /// already resurfaced by an earlier pass (status filter).
    async fn tasks_due_for_resurface(&self, now: DateTime<Utc>) -> EngineResult<Vec<Task>>;

    /// Live tasks past their deferral window that have not been force-flagged
    /// yet. The `force_action` exclusion is the idempotency guard.
    async fn tasks_past_snooze_deadline(&self, now: DateTime<Utc>) -> EngineResult<Vec<Task>>;

    /// Force-flagged tasks whose grace period has expired. Terminal tasks are
    /// excluded, so a task skipped by an earlier pass is never revisited.
    async fn tasks_due_for_auto_skip(&self, now: DateTime<Utc>) -> EngineResult<Vec<Task>>;

    /// All non-terminal tasks, for the attention listing.
    async fn live_tasks(&self) -> EngineResult<Vec<Task>>;

    async fn append_task_transition(&self, transition: &TaskTransition) -> EngineResult<()>;

    // --- Task type policies ---

    /// Policy for a task type; absence of a row yields the defaults.
    async fn get_policy(&self, task_type: TaskType) -> EngineResult<TaskTypePolicy>;
    async fn upsert_policy(&self, policy: &TaskTypePolicy) -> EngineResult<()>;

    // --- Workflow executions & triggers ---

    async fn insert_execution(&self, execution: &WorkflowExecution) -> EngineResult<()>;
    async fn get_execution(&self, id: Uuid) -> EngineResult<Option<WorkflowExecution>>;
    async fn update_execution(&self, execution: &WorkflowExecution) -> EngineResult<()>;
    async fn snoozed_executions(&self) -> EngineResult<Vec<WorkflowExecution>>;

    /// Record the first firing of a trigger. No-op when already fired; the
    /// fired state is never cleared.
    async fn mark_trigger_fired(&self, trigger_id: Uuid, fired_at: DateTime<Utc>)
        -> EngineResult<()>;

    /// Append an evaluation audit row; the store assigns the cumulative
    /// per-trigger evaluation count.
    async fn append_trigger_evaluation(
        &self,
        entry: NewTriggerEvaluation,
    ) -> EngineResult<TriggerEvaluationLog>;

    async fn trigger_evaluations(&self, trigger_id: Uuid)
        -> EngineResult<Vec<TriggerEvaluationLog>>;

    // --- Domain events ---

    async fn insert_event(&self, event: &DomainEvent) -> EngineResult<()>;
    async fn events_since(
        &self,
        event_type: EventType,
        since: DateTime<Utc>,
    ) -> EngineResult<Vec<DomainEvent>>;

    // --- Notifications ---

    async fn insert_notification(&self, notification: &Notification) -> EngineResult<()>;
    async fn list_notifications(&self) -> EngineResult<Vec<Notification>>;
    /// Bulk retention delete; returns the number of rows removed.
    async fn delete_notifications_before(&self, cutoff: DateTime<Utc>) -> EngineResult<u64>;

    // --- Directory lookups ---

    /// The assignee's manager, when one is on record.
    async fn find_manager(&self, assignee: &str) -> EngineResult<Option<String>>;

    /// Display name for an account.
    async fn account_name(&self, account_id: Uuid) -> EngineResult<Option<String>>;
}
