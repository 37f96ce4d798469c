//! # Wake Evaluation Pass
//!
//! Independent batch pass over snoozed workflow executions, driven by the
//! same external scheduler as the daily task pass but sharing none of its
//! queries. Every snoozed execution is run through the wake trigger evaluator
//! each cycle; executions that wake notify their owner.

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::info;

use crate::evaluator::TriggerEvaluator;
use crate::models::NotificationKind;
use crate::notifications::notify_best_effort;
use crate::orchestration::daily_evaluation::EvaluationOrchestrator;
use crate::orchestration::types::WakeEvaluationResult;

impl EvaluationOrchestrator {
    /// Evaluate wake triggers for every snoozed execution.
    ///
    /// Fault tolerance mirrors the daily pass: one execution's failure is
    /// recorded and the rest still evaluate. Evaluation itself stamps
    /// `last_evaluated_at` on every execution, firing or not.
    pub async fn run_wake_evaluation(&self, now: DateTime<Utc>) -> WakeEvaluationResult {
        let mut result = WakeEvaluationResult::default();

        let executions = match self.store.snoozed_executions().await {
            Ok(executions) => executions,
            Err(err) => {
                result.errors.push(format!("snoozed-executions query: {err}"));
                return result;
            }
        };

        let evaluator = TriggerEvaluator::new(self.store.clone());
        for mut execution in executions {
            let execution_id = execution.id;
            result.evaluated += 1;
            match evaluator
                .evaluate(&mut execution, now, self.events.as_ref())
                .await
            {
                Ok(outcome) if outcome.woke => {
                    result.woken += 1;
                    let sent = notify_best_effort(
                        self.sink.as_ref(),
                        &execution.owner,
                        NotificationKind::WorkflowWoken,
                        json!({
                            "execution_id": execution.id,
                            "workflow_name": execution.workflow_name,
                            "fired_trigger_type": outcome.fired_trigger_type,
                            "message": format!(
                                "Workflow \"{}\" has resumed; a wake condition was met",
                                execution.workflow_name
                            ),
                        }),
                        now,
                    )
                    .await;
                    if sent {
                        result.notifications_sent += 1;
                    }
                }
                Ok(_) => result.still_snoozed += 1,
                Err(err) => result.record_error(execution_id, err),
            }
        }

        info!(
            evaluated = result.evaluated,
            woken = result.woken,
            still_snoozed = result.still_snoozed,
            errors = result.errors.len(),
            "wake evaluation pass complete"
        );
        result
    }
}
