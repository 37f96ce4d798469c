//! Shared read surface for the two deferrable entity kinds.
//!
//! Task and WorkflowExecution defer differently — a task waits on a single
//! wake instant, an execution on a trigger set — but the batch drivers and
//! store queries only need a common view: is the unit deferred, and when, if
//! ever, is it due to wake by deadline alone.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{Task, TriggerConfig, WorkflowExecution};

pub trait DeferredUnit {
    fn unit_id(&self) -> Uuid;

    fn is_deferred(&self) -> bool;

    /// The wall-clock deadline that would end the deferral on its own, if one
    /// exists. For a task this is `snoozed_until`; for an execution, the
    /// earliest date trigger in its wake set.
    fn deferral_deadline(&self) -> Option<DateTime<Utc>>;

    /// Due to wake purely by deadline.
    fn wake_due(&self, now: DateTime<Utc>) -> bool {
        self.is_deferred() && self.deferral_deadline().is_some_and(|at| at <= now)
    }
}

impl DeferredUnit for Task {
    fn unit_id(&self) -> Uuid {
        self.id
    }

    fn is_deferred(&self) -> bool {
        self.status.is_deferred()
    }

    fn deferral_deadline(&self) -> Option<DateTime<Utc>> {
        self.snoozed_until
    }
}

impl DeferredUnit for WorkflowExecution {
    fn unit_id(&self) -> Uuid {
        self.id
    }

    fn is_deferred(&self) -> bool {
        self.status.is_deferred()
    }

    fn deferral_deadline(&self) -> Option<DateTime<Utc>> {
        self.wake_triggers
            .iter()
            .filter_map(|trigger| match trigger.config {
                TriggerConfig::Date { target, .. } => Some(target),
                TriggerConfig::Event { .. } => None,
            })
            .min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewTask, TaskCategory, TaskType, Trigger, TriggerLogic};
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_task_wake_due() {
        let now = Utc.with_ymd_and_hms(2025, 5, 1, 9, 0, 0).unwrap();
        let mut task = Task::from_new(
            NewTask {
                account_id: Uuid::new_v4(),
                assignee: "csm-1".into(),
                created_by: "system".into(),
                task_type: TaskType::FollowUp,
                category: TaskCategory::Manual,
                title: "Check in".into(),
                due_date: None,
            },
            now,
        );
        assert!(!task.wake_due(now));

        crate::state_machine::transitions::snooze(
            &mut task,
            &crate::state_machine::SnoozePolicy::default(),
            now + Duration::days(2),
            now,
        )
        .unwrap();
        assert!(!task.wake_due(now + Duration::days(1)));
        assert!(task.wake_due(now + Duration::days(2)));
    }

    #[test]
    fn test_execution_deadline_is_earliest_date_trigger() {
        let now = Utc.with_ymd_and_hms(2025, 5, 1, 9, 0, 0).unwrap();
        let mut execution = WorkflowExecution::new(Uuid::new_v4(), "qbr_prep", "csm-1", now);
        let triggers = vec![
            Trigger::new(
                execution.id,
                0,
                TriggerConfig::Date {
                    target: now + Duration::days(5),
                    timezone: None,
                },
                now,
            ),
            Trigger::new(
                execution.id,
                1,
                TriggerConfig::Date {
                    target: now + Duration::days(2),
                    timezone: Some("America/New_York".into()),
                },
                now,
            ),
        ];
        execution.begin_deferral(triggers, TriggerLogic::Or, now);
        assert_eq!(execution.deferral_deadline(), Some(now + Duration::days(2)));
    }
}
