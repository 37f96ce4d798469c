//! Postgres store gateway.
//!
//! Queries are bound at runtime rather than checked against a compile-time
//! schema cache, so the crate builds without a reachable database. Enum-typed
//! columns are stored as text and round-tripped through Display/FromStr;
//! trigger configuration and matching parameters live in JSONB.
//!
//! Schema (one table per record type):
//! - `tasks`, `task_type_policies`, `task_transitions`
//! - `workflow_executions`, `wake_triggers`, `trigger_evaluation_logs`
//! - `domain_events`, `notifications`
//! - `operators` (assignee → manager), `accounts`

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    DomainEvent, EventType, NewTriggerEvaluation, Notification, Task, TaskTransition, TaskType,
    TaskTypePolicy, Trigger, TriggerConfig, TriggerEvaluationLog, WorkflowExecution,
};
use crate::store::StoreGateway;

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn triggers_for(&self, execution_id: Uuid) -> EngineResult<Vec<Trigger>> {
        let rows = sqlx::query(
            "SELECT id, execution_id, position, config, first_fired_at, created_at \
             FROM wake_triggers WHERE execution_id = $1 ORDER BY position",
        )
        .bind(execution_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(trigger_from_row).collect()
    }

    async fn replace_triggers(&self, execution: &WorkflowExecution) -> EngineResult<()> {
        sqlx::query("DELETE FROM wake_triggers WHERE execution_id = $1")
            .bind(execution.id)
            .execute(&self.pool)
            .await?;

        for trigger in &execution.wake_triggers {
            let config = serde_json::to_value(&trigger.config)?;
            sqlx::query(
                "INSERT INTO wake_triggers \
                 (id, execution_id, position, config, first_fired_at, created_at) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(trigger.id)
            .bind(trigger.execution_id)
            .bind(trigger.position)
            .bind(config)
            .bind(trigger.first_fired_at)
            .bind(trigger.created_at)
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }

    async fn hydrate_execution(&self, row: &PgRow) -> EngineResult<WorkflowExecution> {
        let mut execution = execution_from_row(row)?;
        execution.wake_triggers = self.triggers_for(execution.id).await?;
        Ok(execution)
    }
}

fn parse_field<T>(value: String, field: &str) -> EngineResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| EngineError::Internal(format!("invalid {field} in store: {e}")))
}

fn task_from_row(row: &PgRow) -> EngineResult<Task> {
    let surfaced: serde_json::Value = row.try_get("surfaced_in_workflows")?;
    Ok(Task {
        id: row.try_get("id")?,
        account_id: row.try_get("account_id")?,
        assignee: row.try_get("assignee")?,
        created_by: row.try_get("created_by")?,
        task_type: parse_field(row.try_get("task_type")?, "task_type")?,
        category: parse_field(row.try_get("category")?, "category")?,
        title: row.try_get("title")?,
        status: parse_field(row.try_get("status")?, "status")?,
        due_date: row.try_get("due_date")?,
        first_snoozed_at: row.try_get("first_snoozed_at")?,
        max_snooze_date: row.try_get("max_snooze_date")?,
        snoozed_until: row.try_get("snoozed_until")?,
        snooze_count: row.try_get("snooze_count")?,
        force_action: row.try_get("force_action")?,
        auto_skip_at: row.try_get("auto_skip_at")?,
        completed_at: row.try_get("completed_at")?,
        skipped_at: row.try_get("skipped_at")?,
        skip_reason: row.try_get("skip_reason")?,
        reassigned_from: row.try_get("reassigned_from")?,
        reassigned_at: row.try_get("reassigned_at")?,
        reassignment_reason: row.try_get("reassignment_reason")?,
        surfaced_in_workflows: serde_json::from_value(surfaced)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn execution_from_row(row: &PgRow) -> EngineResult<WorkflowExecution> {
    let fired_trigger_type: Option<String> = row.try_get("fired_trigger_type")?;
    Ok(WorkflowExecution {
        id: row.try_get("id")?,
        account_id: row.try_get("account_id")?,
        workflow_name: row.try_get("workflow_name")?,
        owner: row.try_get("owner")?,
        status: parse_field(row.try_get("status")?, "status")?,
        wake_triggers: Vec::new(),
        wake_trigger_logic: parse_field(row.try_get("wake_trigger_logic")?, "wake_trigger_logic")?,
        snoozed_at: row.try_get("snoozed_at")?,
        last_evaluated_at: row.try_get("last_evaluated_at")?,
        trigger_fired_at: row.try_get("trigger_fired_at")?,
        fired_trigger_type: fired_trigger_type
            .map(|s| parse_field(s, "fired_trigger_type"))
            .transpose()?,
        wake_reason: row.try_get("wake_reason")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn trigger_from_row(row: &PgRow) -> EngineResult<Trigger> {
    let config: serde_json::Value = row.try_get("config")?;
    let config: TriggerConfig = serde_json::from_value(config)?;
    Ok(Trigger {
        id: row.try_get("id")?,
        execution_id: row.try_get("execution_id")?,
        position: row.try_get("position")?,
        config,
        first_fired_at: row.try_get("first_fired_at")?,
        created_at: row.try_get("created_at")?,
    })
}

fn event_from_row(row: &PgRow) -> EngineResult<DomainEvent> {
    Ok(DomainEvent {
        id: row.try_get("id")?,
        event_type: parse_field(row.try_get("event_type")?, "event_type")?,
        account_id: row.try_get("account_id")?,
        params: row.try_get("params")?,
        occurred_at: row.try_get("occurred_at")?,
    })
}

const TASK_COLUMNS: &str = "id, account_id, assignee, created_by, task_type, category, title, \
    status, due_date, first_snoozed_at, max_snooze_date, snoozed_until, snooze_count, \
    force_action, auto_skip_at, completed_at, skipped_at, skip_reason, reassigned_from, \
    reassigned_at, reassignment_reason, surfaced_in_workflows, created_at, updated_at";

const EXECUTION_COLUMNS: &str = "id, account_id, workflow_name, owner, status, \
    wake_trigger_logic, snoozed_at, last_evaluated_at, trigger_fired_at, fired_trigger_type, \
    wake_reason, created_at, updated_at";

#[async_trait]
impl StoreGateway for PgStore {
    async fn insert_task(&self, task: &Task) -> EngineResult<()> {
        let surfaced = serde_json::to_value(&task.surfaced_in_workflows)?;
        sqlx::query(&format!(
            "INSERT INTO tasks ({TASK_COLUMNS}) VALUES \
             ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, \
              $19, $20, $21, $22, $23, $24)"
        ))
        .bind(task.id)
        .bind(task.account_id)
        .bind(&task.assignee)
        .bind(&task.created_by)
        .bind(task.task_type.to_string())
        .bind(task.category.to_string())
        .bind(&task.title)
        .bind(task.status.to_string())
        .bind(task.due_date)
        .bind(task.first_snoozed_at)
        .bind(task.max_snooze_date)
        .bind(task.snoozed_until)
        .bind(task.snooze_count)
        .bind(task.force_action)
        .bind(task.auto_skip_at)
        .bind(task.completed_at)
        .bind(task.skipped_at)
        .bind(&task.skip_reason)
        .bind(&task.reassigned_from)
        .bind(task.reassigned_at)
        .bind(&task.reassignment_reason)
        .bind(surfaced)
        .bind(task.created_at)
        .bind(task.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_task(&self, id: Uuid) -> EngineResult<Option<Task>> {
        let row = sqlx::query(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(task_from_row).transpose()
    }

    async fn update_task(&self, task: &Task) -> EngineResult<()> {
        let surfaced = serde_json::to_value(&task.surfaced_in_workflows)?;
        let result = sqlx::query(
            "UPDATE tasks SET assignee = $2, status = $3, due_date = $4, \
             first_snoozed_at = $5, max_snooze_date = $6, snoozed_until = $7, snooze_count = $8, \
             force_action = $9, auto_skip_at = $10, completed_at = $11, skipped_at = $12, \
             skip_reason = $13, reassigned_from = $14, reassigned_at = $15, \
             reassignment_reason = $16, surfaced_in_workflows = $17, updated_at = $18 \
             WHERE id = $1",
        )
        .bind(task.id)
        .bind(&task.assignee)
        .bind(task.status.to_string())
        .bind(task.due_date)
        .bind(task.first_snoozed_at)
        .bind(task.max_snooze_date)
        .bind(task.snoozed_until)
        .bind(task.snooze_count)
        .bind(task.force_action)
        .bind(task.auto_skip_at)
        .bind(task.completed_at)
        .bind(task.skipped_at)
        .bind(&task.skip_reason)
        .bind(&task.reassigned_from)
        .bind(task.reassigned_at)
        .bind(&task.reassignment_reason)
        .bind(surfaced)
        .bind(task.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(EngineError::not_found("task", task.id));
        }
        Ok(())
    }

    async fn tasks_due_for_resurface(&self, now: DateTime<Utc>) -> EngineResult<Vec<Task>> {
        let rows = sqlx::query(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks \
             WHERE status = 'snoozed' AND snoozed_until <= $1 \
             ORDER BY created_at, id"
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(task_from_row).collect()
    }

    async fn tasks_past_snooze_deadline(&self, now: DateTime<Utc>) -> EngineResult<Vec<Task>> {
        let rows = sqlx::query(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks \
             WHERE status NOT IN ('completed', 'skipped') \
               AND force_action = FALSE \
               AND max_snooze_date IS NOT NULL AND max_snooze_date <= $1 \
             ORDER BY created_at, id"
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(task_from_row).collect()
    }

    async fn tasks_due_for_auto_skip(&self, now: DateTime<Utc>) -> EngineResult<Vec<Task>> {
        let rows = sqlx::query(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks \
             WHERE status NOT IN ('completed', 'skipped') \
               AND force_action = TRUE \
               AND auto_skip_at IS NOT NULL AND auto_skip_at <= $1 \
             ORDER BY created_at, id"
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(task_from_row).collect()
    }

    async fn live_tasks(&self) -> EngineResult<Vec<Task>> {
        let rows = sqlx::query(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks \
             WHERE status NOT IN ('completed', 'skipped') \
             ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(task_from_row).collect()
    }

    async fn append_task_transition(&self, transition: &TaskTransition) -> EngineResult<()> {
        sqlx::query(
            "INSERT INTO task_transitions \
             (id, task_id, from_status, to_status, event, detail, occurred_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(transition.id)
        .bind(transition.task_id)
        .bind(transition.from_status.to_string())
        .bind(transition.to_status.to_string())
        .bind(&transition.event)
        .bind(&transition.detail)
        .bind(transition.occurred_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_policy(&self, task_type: TaskType) -> EngineResult<TaskTypePolicy> {
        let row = sqlx::query(
            "SELECT task_type, auto_skip_enabled, auto_skip_grace_hours, \
             requires_manual_escalation \
             FROM task_type_policies WHERE task_type = $1",
        )
        .bind(task_type.to_string())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(TaskTypePolicy {
                task_type: parse_field(row.try_get("task_type")?, "task_type")?,
                auto_skip_enabled: row.try_get("auto_skip_enabled")?,
                auto_skip_grace_hours: row.try_get("auto_skip_grace_hours")?,
                requires_manual_escalation: row.try_get("requires_manual_escalation")?,
            }),
            None => Ok(TaskTypePolicy::default_for(task_type)),
        }
    }

    async fn upsert_policy(&self, policy: &TaskTypePolicy) -> EngineResult<()> {
        sqlx::query(
            "INSERT INTO task_type_policies \
             (task_type, auto_skip_enabled, auto_skip_grace_hours, requires_manual_escalation) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (task_type) DO UPDATE SET \
               auto_skip_enabled = EXCLUDED.auto_skip_enabled, \
               auto_skip_grace_hours = EXCLUDED.auto_skip_grace_hours, \
               requires_manual_escalation = EXCLUDED.requires_manual_escalation",
        )
        .bind(policy.task_type.to_string())
        .bind(policy.auto_skip_enabled)
        .bind(policy.auto_skip_grace_hours)
        .bind(policy.requires_manual_escalation)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_execution(&self, execution: &WorkflowExecution) -> EngineResult<()> {
        sqlx::query(&format!(
            "INSERT INTO workflow_executions ({EXECUTION_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)"
        ))
        .bind(execution.id)
        .bind(execution.account_id)
        .bind(&execution.workflow_name)
        .bind(&execution.owner)
        .bind(execution.status.to_string())
        .bind(execution.wake_trigger_logic.to_string())
        .bind(execution.snoozed_at)
        .bind(execution.last_evaluated_at)
        .bind(execution.trigger_fired_at)
        .bind(execution.fired_trigger_type.map(|k| k.to_string()))
        .bind(&execution.wake_reason)
        .bind(execution.created_at)
        .bind(execution.updated_at)
        .execute(&self.pool)
        .await?;

        self.replace_triggers(execution).await
    }

    async fn get_execution(&self, id: Uuid) -> EngineResult<Option<WorkflowExecution>> {
        let row = sqlx::query(&format!(
            "SELECT {EXECUTION_COLUMNS} FROM workflow_executions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate_execution(&row).await?)),
            None => Ok(None),
        }
    }

    async fn update_execution(&self, execution: &WorkflowExecution) -> EngineResult<()> {
        let result = sqlx::query(
            "UPDATE workflow_executions SET status = $2, wake_trigger_logic = $3, \
             snoozed_at = $4, last_evaluated_at = $5, trigger_fired_at = $6, \
             fired_trigger_type = $7, wake_reason = $8, updated_at = $9 \
             WHERE id = $1",
        )
        .bind(execution.id)
        .bind(execution.status.to_string())
        .bind(execution.wake_trigger_logic.to_string())
        .bind(execution.snoozed_at)
        .bind(execution.last_evaluated_at)
        .bind(execution.trigger_fired_at)
        .bind(execution.fired_trigger_type.map(|k| k.to_string()))
        .bind(&execution.wake_reason)
        .bind(execution.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(EngineError::not_found("workflow execution", execution.id));
        }

        self.replace_triggers(execution).await
    }

    async fn snoozed_executions(&self) -> EngineResult<Vec<WorkflowExecution>> {
        let rows = sqlx::query(&format!(
            "SELECT {EXECUTION_COLUMNS} FROM workflow_executions \
             WHERE status = 'snoozed' ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        let mut executions = Vec::with_capacity(rows.len());
        for row in &rows {
            executions.push(self.hydrate_execution(row).await?);
        }
        Ok(executions)
    }

    async fn mark_trigger_fired(
        &self,
        trigger_id: Uuid,
        fired_at: DateTime<Utc>,
    ) -> EngineResult<()> {
        sqlx::query(
            "UPDATE wake_triggers SET first_fired_at = $2 \
             WHERE id = $1 AND first_fired_at IS NULL",
        )
        .bind(trigger_id)
        .bind(fired_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn append_trigger_evaluation(
        &self,
        entry: NewTriggerEvaluation,
    ) -> EngineResult<TriggerEvaluationLog> {
        let id = Uuid::new_v4();
        let row = sqlx::query(
            "INSERT INTO trigger_evaluation_logs \
             (id, trigger_id, execution_id, fired, evaluation_count, fired_at, error, evaluated_at) \
             VALUES ($1, $2, $3, $4, \
                     (SELECT COUNT(*) + 1 FROM trigger_evaluation_logs WHERE trigger_id = $2), \
                     $5, $6, $7) \
             RETURNING evaluation_count",
        )
        .bind(id)
        .bind(entry.trigger_id)
        .bind(entry.execution_id)
        .bind(entry.fired)
        .bind(entry.fired_at)
        .bind(&entry.error)
        .bind(entry.evaluated_at)
        .fetch_one(&self.pool)
        .await?;

        let evaluation_count: i32 = row.try_get("evaluation_count")?;
        Ok(TriggerEvaluationLog {
            id,
            trigger_id: entry.trigger_id,
            execution_id: entry.execution_id,
            fired: entry.fired,
            evaluation_count,
            fired_at: entry.fired_at,
            error: entry.error,
            evaluated_at: entry.evaluated_at,
        })
    }

    async fn trigger_evaluations(
        &self,
        trigger_id: Uuid,
    ) -> EngineResult<Vec<TriggerEvaluationLog>> {
        let rows = sqlx::query(
            "SELECT id, trigger_id, execution_id, fired, evaluation_count, fired_at, error, \
             evaluated_at \
             FROM trigger_evaluation_logs WHERE trigger_id = $1 ORDER BY evaluated_at",
        )
        .bind(trigger_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(TriggerEvaluationLog {
                    id: row.try_get("id")?,
                    trigger_id: row.try_get("trigger_id")?,
                    execution_id: row.try_get("execution_id")?,
                    fired: row.try_get("fired")?,
                    evaluation_count: row.try_get("evaluation_count")?,
                    fired_at: row.try_get("fired_at")?,
                    error: row.try_get("error")?,
                    evaluated_at: row.try_get("evaluated_at")?,
                })
            })
            .collect()
    }

    async fn insert_event(&self, event: &DomainEvent) -> EngineResult<()> {
        sqlx::query(
            "INSERT INTO domain_events (id, event_type, account_id, params, occurred_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(event.id)
        .bind(event.event_type.to_string())
        .bind(event.account_id)
        .bind(&event.params)
        .bind(event.occurred_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn events_since(
        &self,
        event_type: EventType,
        since: DateTime<Utc>,
    ) -> EngineResult<Vec<DomainEvent>> {
        let rows = sqlx::query(
            "SELECT id, event_type, account_id, params, occurred_at FROM domain_events \
             WHERE event_type = $1 AND occurred_at >= $2 ORDER BY occurred_at",
        )
        .bind(event_type.to_string())
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(event_from_row).collect()
    }

    async fn insert_notification(&self, notification: &Notification) -> EngineResult<()> {
        sqlx::query(
            "INSERT INTO notifications (id, user_id, kind, payload, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(notification.id)
        .bind(&notification.user_id)
        .bind(notification.kind.to_string())
        .bind(&notification.payload)
        .bind(notification.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_notifications(&self) -> EngineResult<Vec<Notification>> {
        let rows = sqlx::query(
            "SELECT id, user_id, kind, payload, created_at FROM notifications ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(Notification {
                    id: row.try_get("id")?,
                    user_id: row.try_get("user_id")?,
                    kind: parse_field(row.try_get("kind")?, "kind")?,
                    payload: row.try_get("payload")?,
                    created_at: row.try_get("created_at")?,
                })
            })
            .collect()
    }

    async fn delete_notifications_before(&self, cutoff: DateTime<Utc>) -> EngineResult<u64> {
        let result = sqlx::query("DELETE FROM notifications WHERE created_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn find_manager(&self, assignee: &str) -> EngineResult<Option<String>> {
        let row = sqlx::query("SELECT manager_id FROM operators WHERE user_id = $1")
            .bind(assignee)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row
            .map(|r| r.try_get::<Option<String>, _>("manager_id"))
            .transpose()?
            .flatten())
    }

    async fn account_name(&self, account_id: Uuid) -> EngineResult<Option<String>> {
        let row = sqlx::query("SELECT name FROM accounts WHERE id = $1")
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.try_get("name")).transpose()?)
    }
}
