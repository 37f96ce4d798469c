use serde::{Deserialize, Serialize};
use std::fmt;

/// Task status definitions for the deferred-work lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Initial state when a task is created, and the state a snoozed task
    /// resurfaces into
    Pending,
    /// An operator is actively working the task
    InProgress,
    /// Task is deferred until a wake time passes
    Snoozed,
    /// Task finished successfully
    Completed,
    /// Task was skipped, manually or by the auto-skip step
    Skipped,
    /// Task was handed to a new assignee; continues life under new ownership
    Reassigned,
}

impl TaskStatus {
    /// Terminal for the purposes of this engine: never auto-evaluated again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Skipped)
    }

    /// Check if the task is currently deferred
    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Snoozed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Snoozed => write!(f, "snoozed"),
            Self::Completed => write!(f, "completed"),
            Self::Skipped => write!(f, "skipped"),
            Self::Reassigned => write!(f, "reassigned"),
        }
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "snoozed" => Ok(Self::Snoozed),
            "completed" => Ok(Self::Completed),
            "skipped" => Ok(Self::Skipped),
            "reassigned" => Ok(Self::Reassigned),
            _ => Err(format!("Invalid task status: {s}")),
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// Workflow execution status definitions (deferral-relevant subset)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    /// Execution created but not yet running
    Pending,
    /// Execution is actively running steps
    InProgress,
    /// Execution is deferred until a wake trigger fires
    Snoozed,
    /// Execution finished
    Completed,
    /// Execution was cancelled
    Cancelled,
}

impl WorkflowStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Snoozed)
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Snoozed => write!(f, "snoozed"),
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for WorkflowStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "snoozed" => Ok(Self::Snoozed),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("Invalid workflow status: {s}")),
        }
    }
}

impl Default for WorkflowStatus {
    fn default() -> Self {
        Self::Pending
    }
}
