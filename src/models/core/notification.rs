//! Persisted notification rows written by the store-backed sink. Subject to
//! the retention cleanup step of the daily batch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    TaskResurfaced,
    ForceActionWarning,
    TaskAutoSkipped,
    EscalationRequired,
    TaskReassigned,
    WorkflowWoken,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TaskResurfaced => write!(f, "task_resurfaced"),
            Self::ForceActionWarning => write!(f, "force_action_warning"),
            Self::TaskAutoSkipped => write!(f, "task_auto_skipped"),
            Self::EscalationRequired => write!(f, "escalation_required"),
            Self::TaskReassigned => write!(f, "task_reassigned"),
            Self::WorkflowWoken => write!(f, "workflow_woken"),
        }
    }
}

impl std::str::FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "task_resurfaced" => Ok(Self::TaskResurfaced),
            "force_action_warning" => Ok(Self::ForceActionWarning),
            "task_auto_skipped" => Ok(Self::TaskAutoSkipped),
            "escalation_required" => Ok(Self::EscalationRequired),
            "task_reassigned" => Ok(Self::TaskReassigned),
            "workflow_woken" => Ok(Self::WorkflowWoken),
            _ => Err(format!("Invalid notification kind: {s}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: String,
    pub kind: NotificationKind,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        user_id: impl Into<String>,
        kind: NotificationKind,
        payload: serde_json::Value,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            kind,
            payload,
            created_at: now,
        }
    }
}
