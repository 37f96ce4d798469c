//! # Wake Trigger Evaluator
//!
//! Evaluates the trigger set of one snoozed execution against a single
//! injected `now`. Every pass, firing or not, is recorded: each trigger
//! evaluation appends an audit row, and `last_evaluated_at` is stamped on the
//! execution so staleness is observable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{EngineError, EngineResult};
use crate::evaluator::event_source::EventSource;
use crate::evaluator::matching::event_matches;
use crate::models::{
    NewTriggerEvaluation, TriggerConfig, TriggerKind, TriggerLogic, WorkflowExecution,
};
use crate::state_machine::DeferredUnit;
use crate::store::StoreGateway;

/// Result of one evaluation pass over one execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationOutcome {
    pub woke: bool,
    pub fired_trigger_type: Option<TriggerKind>,
    pub triggers_evaluated: usize,
    /// Triggers fired cumulatively, this pass included
    pub triggers_fired: usize,
}

pub struct TriggerEvaluator {
    store: Arc<dyn StoreGateway>,
}

impl TriggerEvaluator {
    pub fn new(store: Arc<dyn StoreGateway>) -> Self {
        Self { store }
    }

    /// Evaluate one snoozed execution's triggers. Mutates the execution in
    /// memory and persists it through the gateway before returning.
    pub async fn evaluate(
        &self,
        execution: &mut WorkflowExecution,
        now: DateTime<Utc>,
        event_source: &dyn EventSource,
    ) -> EngineResult<EvaluationOutcome> {
        if !execution.is_deferred() {
            return Err(EngineError::InvalidTransition {
                from: execution.status.to_string(),
                event: "evaluate_wake_triggers".to_string(),
            });
        }

        let snoozed_at = execution.snoozed_at.unwrap_or(execution.created_at);
        let logic = execution.wake_trigger_logic;
        let mut triggers_evaluated = 0usize;
        let mut fired_this_pass: Option<TriggerKind> = None;

        for index in 0..execution.wake_triggers.len() {
            // A trigger counts as fired once true on any past pass; only
            // still-pending triggers are re-evaluated.
            if execution.wake_triggers[index].has_fired() {
                continue;
            }

            let (fired, error) = match &execution.wake_triggers[index].config {
                TriggerConfig::Date { target, .. } => (now >= *target, None),
                TriggerConfig::Event { event_type, params } => {
                    match event_source.events_since(*event_type, snoozed_at).await {
                        Ok(events) => (
                            events
                                .iter()
                                .any(|event| event_matches(*event_type, params, event)),
                            None,
                        ),
                        Err(err) => (false, Some(err.to_string())),
                    }
                }
            };
            triggers_evaluated += 1;

            let trigger_id = execution.wake_triggers[index].id;
            self.store
                .append_trigger_evaluation(NewTriggerEvaluation {
                    trigger_id,
                    execution_id: execution.id,
                    fired,
                    fired_at: fired.then_some(now),
                    error,
                    evaluated_at: now,
                })
                .await?;

            if fired {
                execution.wake_triggers[index].first_fired_at = Some(now);
                self.store.mark_trigger_fired(trigger_id, now).await?;
                fired_this_pass = Some(execution.wake_triggers[index].kind());

                debug!(
                    execution_id = %execution.id,
                    trigger_id = %trigger_id,
                    kind = %execution.wake_triggers[index].kind(),
                    "wake trigger fired"
                );

                // OR wakes on the first firing trigger.
                if logic == TriggerLogic::Or {
                    break;
                }
            }
        }

        let triggers_fired = execution
            .wake_triggers
            .iter()
            .filter(|t| t.has_fired())
            .count();

        let satisfied = match logic {
            TriggerLogic::Or => fired_this_pass.is_some(),
            TriggerLogic::And => {
                !execution.wake_triggers.is_empty()
                    && triggers_fired == execution.wake_triggers.len()
            }
        };

        execution.record_evaluation(now);

        let outcome = if satisfied {
            let fired_kind = fired_this_pass.or_else(|| {
                execution
                    .wake_triggers
                    .last()
                    .map(crate::models::Trigger::kind)
            });
            execution.wake(fired_kind, None, now);
            info!(
                execution_id = %execution.id,
                fired_trigger_type = ?fired_kind,
                "workflow execution woken by trigger"
            );
            EvaluationOutcome {
                woke: true,
                fired_trigger_type: fired_kind,
                triggers_evaluated,
                triggers_fired,
            }
        } else {
            EvaluationOutcome {
                woke: false,
                fired_trigger_type: None,
                triggers_evaluated,
                triggers_fired,
            }
        };

        self.store.update_execution(execution).await?;
        Ok(outcome)
    }
}
