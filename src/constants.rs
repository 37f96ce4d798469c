//! # System Constants
//!
//! Core constants and event names that define the operational boundaries of
//! the deferred-work lifecycle engine. Values here are the compiled-in
//! defaults; the deployable knobs live in [`crate::config::EngineConfig`].

/// Days a task may remain deferred, anchored to its *first* snooze.
pub const SNOOZE_WINDOW_DAYS: i64 = 7;

/// Grace hours granted after force-flagging before auto-skip, when the task
/// type policy does not override it.
pub const DEFAULT_AUTO_SKIP_GRACE_HOURS: i64 = 24;

/// Upper bound observed in practice for per-type grace configuration.
pub const MAX_AUTO_SKIP_GRACE_HOURS: i64 = 48;

/// Notifications older than this are removed by the retention cleanup step.
pub const NOTIFICATION_RETENTION_DAYS: i64 = 90;

/// Lifecycle event names recorded on transition audit rows and used as
/// structured-log fields.
pub mod events {
    pub const TASK_STARTED: &str = "task.started";
    pub const TASK_SNOOZED: &str = "task.snoozed";
    pub const TASK_RESURFACED: &str = "task.resurfaced";
    pub const TASK_FORCE_FLAGGED: &str = "task.force_flagged";
    pub const TASK_AUTO_SKIPPED: &str = "task.auto_skipped";
    pub const TASK_COMPLETED: &str = "task.completed";
    pub const TASK_SKIPPED: &str = "task.skipped";
    pub const TASK_REASSIGNED: &str = "task.reassigned";

    pub const WORKFLOW_SNOOZED: &str = "workflow.snoozed";
    pub const WORKFLOW_WOKEN: &str = "workflow.woken";
    pub const WORKFLOW_WOKEN_MANUALLY: &str = "workflow.woken_manually";
}
