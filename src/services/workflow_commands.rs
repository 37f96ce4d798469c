//! # Workflow Command Surface
//!
//! Operator-facing entry points for deferring and resuming workflow
//! executions. A snooze request creates a fresh trigger set; existing
//! triggers are never mutated. `wake_now` is the manual override that
//! bypasses trigger evaluation entirely.

use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{NotificationKind, Trigger, TriggerConfig, TriggerLogic, WorkflowExecution};
use crate::notifications::{notify_best_effort, NotificationSink};
use crate::state_machine::DeferredUnit;
use crate::store::StoreGateway;

pub struct WorkflowCommands {
    store: Arc<dyn StoreGateway>,
    sink: Arc<dyn NotificationSink>,
}

impl WorkflowCommands {
    pub fn new(store: Arc<dyn StoreGateway>, sink: Arc<dyn NotificationSink>) -> Self {
        Self { store, sink }
    }

    pub async fn create(
        &self,
        account_id: Uuid,
        workflow_name: impl Into<String>,
        owner: impl Into<String>,
        now: DateTime<Utc>,
    ) -> EngineResult<WorkflowExecution> {
        let execution = WorkflowExecution::new(account_id, workflow_name, owner, now);
        self.store.insert_execution(&execution).await?;
        Ok(execution)
    }

    pub async fn get(&self, execution_id: Uuid) -> EngineResult<WorkflowExecution> {
        self.load(execution_id).await
    }

    /// Defer the execution behind a new trigger set.
    ///
    /// At least one trigger is required — a deferral with no wake condition
    /// could only ever be ended manually, which is almost always a caller
    /// mistake.
    pub async fn snooze(
        &self,
        execution_id: Uuid,
        configs: Vec<TriggerConfig>,
        logic: TriggerLogic,
        now: DateTime<Utc>,
    ) -> EngineResult<WorkflowExecution> {
        if configs.is_empty() {
            return Err(EngineError::PolicyViolation(
                "at least one wake trigger is required to snooze a workflow execution".to_string(),
            ));
        }

        let mut execution = self.load(execution_id).await?;
        if execution.status.is_terminal() || execution.is_deferred() {
            return Err(EngineError::InvalidTransition {
                from: execution.status.to_string(),
                event: crate::constants::events::WORKFLOW_SNOOZED.to_string(),
            });
        }

        let triggers: Vec<Trigger> = configs
            .into_iter()
            .enumerate()
            .map(|(position, config)| Trigger::new(execution.id, position as i32, config, now))
            .collect();
        execution.begin_deferral(triggers, logic, now);
        self.store.update_execution(&execution).await?;
        Ok(execution)
    }

    /// Manual override: wake the execution immediately, recording the reason,
    /// without consulting its triggers.
    pub async fn wake_now(
        &self,
        execution_id: Uuid,
        reason: impl Into<String>,
        now: DateTime<Utc>,
    ) -> EngineResult<WorkflowExecution> {
        let reason = reason.into();
        let mut execution = self.load(execution_id).await?;
        if !execution.is_deferred() {
            return Err(EngineError::InvalidTransition {
                from: execution.status.to_string(),
                event: crate::constants::events::WORKFLOW_WOKEN_MANUALLY.to_string(),
            });
        }

        execution.wake(None, Some(reason.clone()), now);
        self.store.update_execution(&execution).await?;

        notify_best_effort(
            self.sink.as_ref(),
            &execution.owner,
            NotificationKind::WorkflowWoken,
            json!({
                "execution_id": execution.id,
                "workflow_name": execution.workflow_name,
                "reason": reason,
                "manual": true,
            }),
            now,
        )
        .await;
        Ok(execution)
    }

    async fn load(&self, execution_id: Uuid) -> EngineResult<WorkflowExecution> {
        self.store
            .get_execution(execution_id)
            .await?
            .ok_or(EngineError::not_found("workflow execution", execution_id))
    }
}
