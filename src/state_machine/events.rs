use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Events that can trigger task status transitions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum TaskEvent {
    /// An operator picks the task up
    Start,
    /// Defer the task until the requested wake instant
    Snooze(DateTime<Utc>),
    /// The requested wake time passed; return the task to the queue
    Resurface,
    /// The deferral window expired; the task now requires guaranteed
    /// resolution
    FlagForceAction,
    /// The post-flag grace period expired
    AutoSkip,
    /// Mark the task done
    Complete,
    /// Skip the task with an operator-supplied reason
    Skip(String),
    /// Hand the task to a new assignee
    Reassign { to: String, reason: String },
}

impl TaskEvent {
    /// String representation of the event type for audit rows and logging
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Start => crate::constants::events::TASK_STARTED,
            Self::Snooze(_) => crate::constants::events::TASK_SNOOZED,
            Self::Resurface => crate::constants::events::TASK_RESURFACED,
            Self::FlagForceAction => crate::constants::events::TASK_FORCE_FLAGGED,
            Self::AutoSkip => crate::constants::events::TASK_AUTO_SKIPPED,
            Self::Complete => crate::constants::events::TASK_COMPLETED,
            Self::Skip(_) => crate::constants::events::TASK_SKIPPED,
            Self::Reassign { .. } => crate::constants::events::TASK_REASSIGNED,
        }
    }

    /// Check if this event moves the task into a terminal status
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Skip(_) | Self::AutoSkip)
    }
}
