//! # Task Lifecycle Transitions
//!
//! The single `(status, event)` transition table plus the lifecycle functions
//! that apply it. Each function validates, mutates the task in memory, and
//! returns the [`TaskTransition`] audit row for the caller to persist
//! alongside the record. Nothing is mutated when validation fails.

use chrono::{DateTime, Utc};

use crate::error::{EngineError, EngineResult};
use crate::models::{Task, TaskTransition, TaskTypePolicy};
use crate::state_machine::events::TaskEvent;
use crate::state_machine::policy::SnoozePolicy;
use crate::state_machine::states::TaskStatus;

/// Resolve the target status for an event, or reject the pair.
///
/// `completed` and `skipped` are terminal here: no event is legal from them.
/// `reassigned` keeps the task live and behaves like `pending` for legality.
pub fn determine_target_status(
    current: TaskStatus,
    event: &TaskEvent,
) -> EngineResult<TaskStatus> {
    use TaskStatus::*;

    let target = match (current, event) {
        (Pending | Reassigned, TaskEvent::Start) => InProgress,
        (Pending | InProgress | Reassigned, TaskEvent::Snooze(_)) => Snoozed,

        (Snoozed, TaskEvent::Resurface) => Pending,
        (Snoozed, TaskEvent::Start) => InProgress,

        // Completion and skipping are direct transitions from any
        // non-terminal status.
        (Pending | InProgress | Snoozed | Reassigned, TaskEvent::Complete) => Completed,
        (Pending | InProgress | Snoozed | Reassigned, TaskEvent::Skip(_)) => Skipped,
        (Pending | InProgress | Snoozed | Reassigned, TaskEvent::AutoSkip) => Skipped,

        (Pending | InProgress | Snoozed | Reassigned, TaskEvent::Reassign { .. }) => Reassigned,

        // Force-flagging never moves the status; it is validated separately
        // in `flag_force_action`.
        (current, TaskEvent::FlagForceAction) if !current.is_terminal() => current,

        (from, event) => {
            return Err(EngineError::InvalidTransition {
                from: from.to_string(),
                event: event.event_type().to_string(),
            })
        }
    };

    Ok(target)
}

fn apply(task: &mut Task, event: &TaskEvent, now: DateTime<Utc>) -> EngineResult<TaskTransition> {
    let from = task.status;
    let to = determine_target_status(from, event)?;
    task.status = to;
    task.updated_at = now;
    Ok(TaskTransition::new(task.id, from, to, event.event_type(), None, now))
}

/// An operator picks the task up.
pub fn start(task: &mut Task, now: DateTime<Utc>) -> EngineResult<TaskTransition> {
    apply(task, &TaskEvent::Start, now)
}

/// Defer the task until `requested_wake`.
///
/// Re-validates against the snooze policy even when the caller already
/// checked, to avoid races between validation and application. The first
/// snooze anchors the deferral window: `first_snoozed_at = now` and
/// `max_snooze_date = now + window`, both immutable afterwards.
pub fn snooze(
    task: &mut Task,
    policy: &SnoozePolicy,
    requested_wake: DateTime<Utc>,
    now: DateTime<Utc>,
) -> EngineResult<TaskTransition> {
    // Transition legality first, so a snooze on a completed task reports
    // InvalidTransition rather than a policy error.
    determine_target_status(task.status, &TaskEvent::Snooze(requested_wake))?;

    let validation = policy.validate(task, requested_wake, now);
    if let Some(reason) = validation.rejection_reason() {
        return Err(EngineError::PolicyViolation(reason.to_string()));
    }

    let transition = apply(task, &TaskEvent::Snooze(requested_wake), now)?;

    if task.first_snoozed_at.is_none() {
        task.first_snoozed_at = Some(now);
        task.max_snooze_date = Some(now + policy.window);
    }
    task.snoozed_until = Some(requested_wake);
    task.snooze_count += 1;

    Ok(transition)
}

/// Return a snoozed task to the queue once its wake time has passed.
pub fn resurface(task: &mut Task, now: DateTime<Utc>) -> EngineResult<TaskTransition> {
    let transition = apply(task, &TaskEvent::Resurface, now)?;
    task.snoozed_until = None;
    Ok(transition)
}

/// Mark a task whose deferral window has expired as requiring guaranteed
/// resolution. Does not change the status.
///
/// Only legal when `now >= max_snooze_date` and the flag is not already set;
/// the orchestrator's query provides the idempotency guard, this function
/// enforces it for direct callers. `auto_skip_at` is only computed when the
/// policy allows auto-skipping — otherwise the task waits for manual
/// resolution indefinitely.
pub fn flag_force_action(
    task: &mut Task,
    policy: &TaskTypePolicy,
    now: DateTime<Utc>,
) -> EngineResult<TaskTransition> {
    determine_target_status(task.status, &TaskEvent::FlagForceAction)?;

    match task.max_snooze_date {
        Some(max) if now >= max => {}
        _ => {
            return Err(EngineError::InvalidTransition {
                from: task.status.to_string(),
                event: TaskEvent::FlagForceAction.event_type().to_string(),
            })
        }
    }
    if task.force_action {
        return Err(EngineError::InvalidTransition {
            from: task.status.to_string(),
            event: TaskEvent::FlagForceAction.event_type().to_string(),
        });
    }

    let transition = apply(task, &TaskEvent::FlagForceAction, now)?;
    task.force_action = true;
    task.auto_skip_at = policy
        .auto_skip_enabled
        .then(|| now + policy.grace_period());

    Ok(transition)
}

/// Skip a force-flagged task whose grace period has expired.
pub fn auto_skip(
    task: &mut Task,
    policy: &TaskTypePolicy,
    now: DateTime<Utc>,
) -> EngineResult<TaskTransition> {
    let due = task.force_action && task.auto_skip_at.is_some_and(|at| at <= now);
    if !due {
        return Err(EngineError::InvalidTransition {
            from: task.status.to_string(),
            event: TaskEvent::AutoSkip.event_type().to_string(),
        });
    }

    let transition = apply(task, &TaskEvent::AutoSkip, now)?;
    task.skipped_at = Some(now);
    task.skip_reason = Some(format!(
        "Automatically skipped after the {}-hour grace period expired without resolution",
        policy.auto_skip_grace_hours
    ));
    Ok(transition)
}

pub fn complete(task: &mut Task, now: DateTime<Utc>) -> EngineResult<TaskTransition> {
    let transition = apply(task, &TaskEvent::Complete, now)?;
    task.completed_at = Some(now);
    Ok(transition)
}

pub fn skip(task: &mut Task, reason: String, now: DateTime<Utc>) -> EngineResult<TaskTransition> {
    let transition = apply(task, &TaskEvent::Skip(reason.clone()), now)?;
    task.skipped_at = Some(now);
    task.skip_reason = Some(reason);
    Ok(transition)
}

/// Hand the task to a new assignee. Records the previous assignee before
/// overwriting; policy fields are not reset.
pub fn reassign(
    task: &mut Task,
    new_assignee: String,
    reason: String,
    now: DateTime<Utc>,
) -> EngineResult<TaskTransition> {
    let event = TaskEvent::Reassign {
        to: new_assignee.clone(),
        reason: reason.clone(),
    };
    let transition = apply(task, &event, now)?;
    task.reassigned_from = Some(std::mem::replace(&mut task.assignee, new_assignee));
    task.reassigned_at = Some(now);
    task.reassignment_reason = Some(reason);
    Ok(transition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewTask, TaskCategory, TaskType};
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 1, 9, 0, 0).unwrap() + Duration::days(n)
    }

    fn task() -> Task {
        Task::from_new(
            NewTask {
                account_id: Uuid::new_v4(),
                assignee: "csm-1".into(),
                created_by: "system".into(),
                task_type: TaskType::Renewal,
                category: TaskCategory::Generated,
                title: "Renewal prep".into(),
                due_date: None,
            },
            day(0),
        )
    }

    #[test]
    fn test_first_snooze_establishes_window_once() {
        let policy = SnoozePolicy::default();
        let mut task = task();

        snooze(&mut task, &policy, day(3), day(0)).unwrap();
        assert_eq!(task.status, TaskStatus::Snoozed);
        assert_eq!(task.first_snoozed_at, Some(day(0)));
        assert_eq!(task.max_snooze_date, Some(day(7)));
        assert_eq!(task.snoozed_until, Some(day(3)));
        assert_eq!(task.snooze_count, 1);

        // A later snooze moves the wake date but never the window anchors.
        resurface(&mut task, day(3)).unwrap();
        snooze(&mut task, &policy, day(6), day(3)).unwrap();
        assert_eq!(task.first_snoozed_at, Some(day(0)));
        assert_eq!(task.max_snooze_date, Some(day(7)));
        assert_eq!(task.snoozed_until, Some(day(6)));
        assert_eq!(task.snooze_count, 2);
    }

    #[test]
    fn test_snooze_past_window_fails_without_mutation() {
        let policy = SnoozePolicy::default();
        let mut task = task();
        snooze(&mut task, &policy, day(3), day(0)).unwrap();
        resurface(&mut task, day(3)).unwrap();

        let before = task.clone();
        let err = snooze(&mut task, &policy, day(9), day(3)).unwrap_err();
        assert!(matches!(err, EngineError::PolicyViolation(_)));
        assert_eq!(task, before);
    }

    #[test]
    fn test_snooze_on_terminal_task_is_invalid_transition() {
        let policy = SnoozePolicy::default();
        let mut task = task();
        complete(&mut task, day(1)).unwrap();

        let err = snooze(&mut task, &policy, day(2), day(1)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidTransition { .. }));
    }

    #[test]
    fn test_resurface_only_from_snoozed() {
        let mut task = task();
        let err = resurface(&mut task, day(1)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidTransition { .. }));

        snooze(&mut task, &SnoozePolicy::default(), day(2), day(0)).unwrap();
        let transition = resurface(&mut task, day(2)).unwrap();
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(task.snoozed_until.is_none());
        assert_eq!(transition.from_status, TaskStatus::Snoozed);
        assert_eq!(transition.to_status, TaskStatus::Pending);
    }

    #[test]
    fn test_flag_force_action_sets_grace_when_enabled() {
        let mut task = task();
        snooze(&mut task, &SnoozePolicy::default(), day(3), day(0)).unwrap();

        let policy = TaskTypePolicy::default_for(TaskType::Renewal);
        let transition = flag_force_action(&mut task, &policy, day(7)).unwrap();
        assert!(task.force_action);
        assert_eq!(task.auto_skip_at, Some(day(7) + Duration::hours(24)));
        assert_eq!(task.status, TaskStatus::Snoozed);
        assert_eq!(transition.from_status, transition.to_status);
    }

    #[test]
    fn test_flag_force_action_without_grace_when_disabled() {
        let mut task = task();
        snooze(&mut task, &SnoozePolicy::default(), day(3), day(0)).unwrap();

        let policy = TaskTypePolicy {
            auto_skip_enabled: false,
            ..TaskTypePolicy::default_for(TaskType::Renewal)
        };
        flag_force_action(&mut task, &policy, day(8)).unwrap();
        assert!(task.force_action);
        assert!(task.auto_skip_at.is_none());
    }

    #[test]
    fn test_flag_force_action_before_deadline_rejected() {
        let mut task = task();
        snooze(&mut task, &SnoozePolicy::default(), day(3), day(0)).unwrap();

        let policy = TaskTypePolicy::default_for(TaskType::Renewal);
        let err = flag_force_action(&mut task, &policy, day(5)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidTransition { .. }));
        assert!(!task.force_action);
    }

    #[test]
    fn test_auto_skip_requires_expired_grace() {
        let mut task = task();
        snooze(&mut task, &SnoozePolicy::default(), day(3), day(0)).unwrap();
        let policy = TaskTypePolicy::default_for(TaskType::Renewal);
        flag_force_action(&mut task, &policy, day(7)).unwrap();

        let too_early = day(7) + Duration::hours(23);
        assert!(auto_skip(&mut task, &policy, too_early).is_err());

        let late_enough = day(7) + Duration::hours(25);
        auto_skip(&mut task, &policy, late_enough).unwrap();
        assert_eq!(task.status, TaskStatus::Skipped);
        assert!(task
            .skip_reason
            .as_deref()
            .unwrap()
            .contains("24-hour grace period"));
    }

    #[test]
    fn test_reassign_records_previous_assignee() {
        let mut task = task();
        reassign(&mut task, "csm-2".into(), "coverage change".into(), day(1)).unwrap();
        assert_eq!(task.status, TaskStatus::Reassigned);
        assert_eq!(task.assignee, "csm-2");
        assert_eq!(task.reassigned_from.as_deref(), Some("csm-1"));
        assert_eq!(task.reassignment_reason.as_deref(), Some("coverage change"));

        // Reassigned tasks stay live: a further snooze is legal and policy
        // fields carry over untouched.
        snooze(&mut task, &SnoozePolicy::default(), day(2), day(1)).unwrap();
        assert_eq!(task.snooze_count, 1);
    }

    #[test]
    fn test_terminal_states_reject_everything() {
        let mut task = task();
        skip(&mut task, "not relevant".into(), day(1)).unwrap();
        assert!(start(&mut task, day(2)).is_err());
        assert!(complete(&mut task, day(2)).is_err());
        assert!(reassign(&mut task, "x".into(), "y".into(), day(2)).is_err());
    }
}
