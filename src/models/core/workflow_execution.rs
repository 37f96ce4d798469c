//! # Workflow Execution Model (deferral-relevant subset)
//!
//! Only the deferral surface of a workflow execution lives in this engine:
//! the wake trigger set, the AND/OR combination mode, and the evaluation
//! bookkeeping. Deferral fields are created when a snooze request is made and
//! cleared, not reused, once the execution wakes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::core::trigger::{Trigger, TriggerKind, TriggerLogic};
use crate::state_machine::WorkflowStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowExecution {
    pub id: Uuid,
    pub account_id: Uuid,
    pub workflow_name: String,
    /// Operator watching this execution; receives the wake notification
    pub owner: String,
    pub status: WorkflowStatus,

    pub wake_triggers: Vec<Trigger>,
    pub wake_trigger_logic: TriggerLogic,

    /// When the current deferral began; event triggers only match events
    /// observed after this instant
    pub snoozed_at: Option<DateTime<Utc>>,
    /// Updated on every evaluation pass, firing or not
    pub last_evaluated_at: Option<DateTime<Utc>>,
    pub trigger_fired_at: Option<DateTime<Utc>>,
    pub fired_trigger_type: Option<TriggerKind>,
    /// Reason recorded by a manual wake override
    pub wake_reason: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkflowExecution {
    pub fn new(
        account_id: Uuid,
        workflow_name: impl Into<String>,
        owner: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            workflow_name: workflow_name.into(),
            owner: owner.into(),
            status: WorkflowStatus::InProgress,
            wake_triggers: Vec::new(),
            wake_trigger_logic: TriggerLogic::default(),
            snoozed_at: None,
            last_evaluated_at: None,
            trigger_fired_at: None,
            fired_trigger_type: None,
            wake_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Defer the execution behind a fresh trigger set. Replaces any previous
    /// set wholesale; triggers are never mutated in place.
    pub fn begin_deferral(
        &mut self,
        triggers: Vec<Trigger>,
        logic: TriggerLogic,
        now: DateTime<Utc>,
    ) {
        self.status = WorkflowStatus::Snoozed;
        self.wake_triggers = triggers;
        self.wake_trigger_logic = logic;
        self.snoozed_at = Some(now);
        self.trigger_fired_at = None;
        self.fired_trigger_type = None;
        self.wake_reason = None;
        self.updated_at = now;
    }

    /// Resume the execution, recording which trigger type ended the deferral
    /// (or a manual reason). Clears the deferral fields.
    pub fn wake(
        &mut self,
        fired: Option<TriggerKind>,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) {
        self.status = WorkflowStatus::InProgress;
        self.trigger_fired_at = Some(now);
        self.fired_trigger_type = fired;
        self.wake_reason = reason;
        self.wake_triggers = Vec::new();
        self.snoozed_at = None;
        self.updated_at = now;
    }

    pub fn record_evaluation(&mut self, now: DateTime<Utc>) {
        self.last_evaluated_at = Some(now);
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::core::trigger::TriggerConfig;
    use chrono::TimeZone;

    #[test]
    fn test_wake_clears_deferral_fields() {
        let now = Utc.with_ymd_and_hms(2025, 4, 10, 8, 0, 0).unwrap();
        let mut execution = WorkflowExecution::new(Uuid::new_v4(), "renewal_play", "csm-1", now);
        let trigger = Trigger::new(
            execution.id,
            0,
            TriggerConfig::Date {
                target: now + chrono::Duration::days(2),
                timezone: None,
            },
            now,
        );
        execution.begin_deferral(vec![trigger], TriggerLogic::Or, now);
        assert_eq!(execution.status, WorkflowStatus::Snoozed);
        assert_eq!(execution.snoozed_at, Some(now));
        assert_eq!(execution.wake_triggers.len(), 1);

        let later = now + chrono::Duration::days(2);
        execution.wake(Some(TriggerKind::Date), None, later);
        assert_eq!(execution.status, WorkflowStatus::InProgress);
        assert!(execution.wake_triggers.is_empty());
        assert!(execution.snoozed_at.is_none());
        assert_eq!(execution.trigger_fired_at, Some(later));
        assert_eq!(execution.fired_trigger_type, Some(TriggerKind::Date));
    }
}
