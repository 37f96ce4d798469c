//! # Daily Evaluation Orchestrator
//!
//! Single-pass batch driver over the task lifecycle: resurface due snoozes,
//! flag tasks past their deferral window, auto-skip expired grace periods,
//! then clean up old notifications. Steps run strictly in that order and each
//! is independently fault-tolerant — a failure processing one candidate is
//! recorded against that candidate's id and processing continues.
//!
//! Every step's query excludes already-processed candidates, so re-running
//! the pass with the same `now` changes nothing; the external scheduler
//! offers no locking and relies on that idempotency. One `now` per pass: the
//! clock is sampled by the caller, never re-read per candidate.

use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::evaluator::{EventSource, StoreEventSource};
use crate::logging::log_batch_step;
use crate::models::{NotificationKind, Task};
use crate::notifications::{notify_best_effort, NotificationSink};
use crate::orchestration::types::EvaluationResult;
use crate::state_machine::transitions;
use crate::store::StoreGateway;

pub struct EvaluationOrchestrator {
    pub(crate) store: Arc<dyn StoreGateway>,
    pub(crate) sink: Arc<dyn NotificationSink>,
    pub(crate) events: Arc<dyn EventSource>,
    pub(crate) config: EngineConfig,
}

impl EvaluationOrchestrator {
    pub fn new(store: Arc<dyn StoreGateway>, sink: Arc<dyn NotificationSink>) -> Self {
        let events = Arc::new(StoreEventSource::new(store.clone()));
        Self {
            store,
            sink,
            events,
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Override the event source consulted by the wake-trigger pass.
    pub fn with_event_source(mut self, events: Arc<dyn EventSource>) -> Self {
        self.events = events;
        self
    }

    /// Run the four task batch steps for one scheduled invocation.
    ///
    /// Never returns an error: dependency failures are recorded per candidate
    /// in the result's error list.
    pub async fn run_daily_evaluation(&self, now: DateTime<Utc>) -> EvaluationResult {
        let mut result = EvaluationResult::default();

        self.resurface_due_tasks(now, &mut result).await;
        self.flag_overdue_tasks(now, &mut result).await;
        self.auto_skip_expired_tasks(now, &mut result).await;
        self.cleanup_notifications(now, &mut result).await;

        info!(
            resurfaced = result.resurfaced,
            force_flagged = result.force_flagged,
            auto_skipped = result.auto_skipped,
            notifications_sent = result.notifications_sent,
            notifications_deleted = result.notifications_deleted,
            errors = result.errors.len(),
            "daily evaluation pass complete"
        );
        result
    }

    /// Step 1: return snoozed tasks whose wake time has passed to the queue.
    async fn resurface_due_tasks(&self, now: DateTime<Utc>, result: &mut EvaluationResult) {
        let candidates = match self.store.tasks_due_for_resurface(now).await {
            Ok(tasks) => tasks,
            Err(err) => {
                result.errors.push(format!("resurface query: {err}"));
                return;
            }
        };

        let mut failed = 0usize;
        for mut task in candidates {
            let task_id = task.id;
            match self.resurface_one(&mut task, now).await {
                Ok(sent) => {
                    result.resurfaced += 1;
                    result.record_sent(sent);
                }
                Err(err) => {
                    failed += 1;
                    result.record_error("resurface", task_id, err);
                }
            }
        }
        log_batch_step("resurface", result.resurfaced, failed);
    }

    async fn resurface_one(&self, task: &mut Task, now: DateTime<Utc>) -> EngineResult<bool> {
        let transition = transitions::resurface(task, now)?;
        self.store.update_task(task).await?;
        self.store.append_task_transition(&transition).await?;

        let account_name = self.lookup_account_name(task).await;
        let sent = notify_best_effort(
            self.sink.as_ref(),
            &task.assignee,
            NotificationKind::TaskResurfaced,
            json!({
                "task_id": task.id,
                "title": task.title,
                "account_name": account_name,
                "message": format!("Task \"{}\" is back from snooze and needs attention", task.title),
            }),
            now,
        )
        .await;
        Ok(sent)
    }

    /// Step 2: mark tasks past their deferral window as requiring guaranteed
    /// resolution, warn the assignee, and escalate where policy demands it.
    async fn flag_overdue_tasks(&self, now: DateTime<Utc>, result: &mut EvaluationResult) {
        let candidates = match self.store.tasks_past_snooze_deadline(now).await {
            Ok(tasks) => tasks,
            Err(err) => {
                result.errors.push(format!("force-flag query: {err}"));
                return;
            }
        };

        let mut failed = 0usize;
        for mut task in candidates {
            let task_id = task.id;
            match self.flag_one(&mut task, now, result).await {
                Ok(sent) => {
                    result.force_flagged += 1;
                    result.record_sent(sent);
                }
                Err(err) => {
                    failed += 1;
                    result.record_error("force-flag", task_id, err);
                }
            }
        }
        log_batch_step("force-flag", result.force_flagged, failed);
    }

    async fn flag_one(
        &self,
        task: &mut Task,
        now: DateTime<Utc>,
        result: &mut EvaluationResult,
    ) -> EngineResult<bool> {
        let policy = self.store.get_policy(task.task_type).await?;
        let transition = transitions::flag_force_action(task, &policy, now)?;
        // State write first; the notification and escalation below are
        // strictly secondary and never roll the flag back.
        self.store.update_task(task).await?;
        self.store.append_task_transition(&transition).await?;

        let warning = match task.auto_skip_at {
            Some(deadline) => format!(
                "Task \"{}\" exceeded its snooze window and will be skipped automatically at {} unless resolved",
                task.title, deadline
            ),
            None => format!(
                "Task \"{}\" exceeded its snooze window and requires manual resolution",
                task.title
            ),
        };
        let sent = notify_best_effort(
            self.sink.as_ref(),
            &task.assignee,
            NotificationKind::ForceActionWarning,
            json!({
                "task_id": task.id,
                "title": task.title,
                "max_snooze_date": task.max_snooze_date,
                "auto_skip_at": task.auto_skip_at,
                "message": warning,
            }),
            now,
        )
        .await;

        if policy.requires_manual_escalation {
            let escalation_sent = self.escalate(task, now).await;
            result.record_sent(escalation_sent);
        }
        Ok(sent)
    }

    /// Notify the assignee's manager about a stalled task. Best-effort: a
    /// missing manager or a failed lookup is logged and skipped, never an
    /// error. Returns whether a notification was delivered.
    pub async fn escalate(&self, task: &Task, now: DateTime<Utc>) -> bool {
        let manager = match self.store.find_manager(&task.assignee).await {
            Ok(Some(manager)) => manager,
            Ok(None) => {
                warn!(
                    task_id = %task.id,
                    assignee = %task.assignee,
                    "no manager on record for assignee; skipping escalation"
                );
                return false;
            }
            Err(err) => {
                warn!(
                    task_id = %task.id,
                    assignee = %task.assignee,
                    error = %err,
                    "manager lookup failed; skipping escalation"
                );
                return false;
            }
        };

        let account_name = self.lookup_account_name(task).await;
        notify_best_effort(
            self.sink.as_ref(),
            &manager,
            NotificationKind::EscalationRequired,
            json!({
                "task_id": task.id,
                "title": task.title,
                "assignee": task.assignee,
                "task_type": task.task_type,
                "account_name": account_name,
                "message": format!(
                    "Task \"{}\" assigned to {} has stalled past its deferral window and needs intervention",
                    task.title, task.assignee
                ),
            }),
            now,
        )
        .await
    }

    /// Step 3: skip force-flagged tasks whose grace period has expired.
    async fn auto_skip_expired_tasks(&self, now: DateTime<Utc>, result: &mut EvaluationResult) {
        let candidates = match self.store.tasks_due_for_auto_skip(now).await {
            Ok(tasks) => tasks,
            Err(err) => {
                result.errors.push(format!("auto-skip query: {err}"));
                return;
            }
        };

        let mut failed = 0usize;
        for mut task in candidates {
            let task_id = task.id;
            match self.auto_skip_one(&mut task, now).await {
                Ok(sent) => {
                    result.auto_skipped += 1;
                    result.record_sent(sent);
                }
                Err(err) => {
                    failed += 1;
                    result.record_error("auto-skip", task_id, err);
                }
            }
        }
        log_batch_step("auto-skip", result.auto_skipped, failed);
    }

    async fn auto_skip_one(&self, task: &mut Task, now: DateTime<Utc>) -> EngineResult<bool> {
        // Grace hours are re-derived from the policy so the skip reason cites
        // the configuration that produced the deadline.
        let policy = self.store.get_policy(task.task_type).await?;
        let transition = transitions::auto_skip(task, &policy, now)?;
        self.store.update_task(task).await?;
        self.store.append_task_transition(&transition).await?;

        let sent = notify_best_effort(
            self.sink.as_ref(),
            &task.assignee,
            NotificationKind::TaskAutoSkipped,
            json!({
                "task_id": task.id,
                "title": task.title,
                "reason": task.skip_reason,
            }),
            now,
        )
        .await;
        Ok(sent)
    }

    /// Step 4: bulk retention delete of old notification rows.
    async fn cleanup_notifications(&self, now: DateTime<Utc>, result: &mut EvaluationResult) {
        let cutoff = now - self.config.notification_retention();
        match self.store.delete_notifications_before(cutoff).await {
            Ok(deleted) => {
                result.notifications_deleted = deleted;
                log_batch_step("notification-cleanup", deleted as usize, 0);
            }
            Err(err) => {
                result.errors.push(format!("notification cleanup: {err}"));
            }
        }
    }

    async fn lookup_account_name(&self, task: &Task) -> Option<String> {
        match self.store.account_name(task.account_id).await {
            Ok(name) => name,
            Err(err) => {
                warn!(
                    task_id = %task.id,
                    account_id = %task.account_id,
                    error = %err,
                    "account lookup failed; notifying without account name"
                );
                None
            }
        }
    }
}
