//! # Task Model
//!
//! A unit of deferred work assigned to one operator. The task record carries
//! the full deferral bookkeeping the engine operates on: the one-shot
//! `first_snoozed_at`/`max_snooze_date` pair anchoring the bounded-snooze
//! window, the mutable `snoozed_until` wake request, and the escalation
//! fields written by the daily batch.
//!
//! Status transitions go through [`crate::state_machine`]; nothing here
//! mutates `status` directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::state_machine::TaskStatus;

/// Closed enumeration of task types known to the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Renewal,
    StrategicReview,
    Opportunity,
    RiskMitigation,
    Onboarding,
    FollowUp,
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Renewal => write!(f, "renewal"),
            Self::StrategicReview => write!(f, "strategic_review"),
            Self::Opportunity => write!(f, "opportunity"),
            Self::RiskMitigation => write!(f, "risk_mitigation"),
            Self::Onboarding => write!(f, "onboarding"),
            Self::FollowUp => write!(f, "follow_up"),
        }
    }
}

impl std::str::FromStr for TaskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "renewal" => Ok(Self::Renewal),
            "strategic_review" => Ok(Self::StrategicReview),
            "opportunity" => Ok(Self::Opportunity),
            "risk_mitigation" => Ok(Self::RiskMitigation),
            "onboarding" => Ok(Self::Onboarding),
            "follow_up" => Ok(Self::FollowUp),
            _ => Err(format!("Invalid task type: {s}")),
        }
    }
}

/// How the task came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    Generated,
    Manual,
    System,
}

impl fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generated => write!(f, "generated"),
            Self::Manual => write!(f, "manual"),
            Self::System => write!(f, "system"),
        }
    }
}

impl std::str::FromStr for TaskCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "generated" => Ok(Self::Generated),
            "manual" => Ok(Self::Manual),
            "system" => Ok(Self::System),
            _ => Err(format!("Invalid task category: {s}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub account_id: Uuid,
    pub assignee: String,
    pub created_by: String,
    pub task_type: TaskType,
    pub category: TaskCategory,
    pub title: String,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,

    // Deferral bookkeeping. `first_snoozed_at` and `max_snooze_date` are set
    // exactly once, on the first snooze, and never overwritten.
    pub first_snoozed_at: Option<DateTime<Utc>>,
    pub max_snooze_date: Option<DateTime<Utc>>,
    pub snoozed_until: Option<DateTime<Utc>>,
    pub snooze_count: i32,

    // Escalation
    pub force_action: bool,
    pub auto_skip_at: Option<DateTime<Utc>>,

    // Terminal bookkeeping
    pub completed_at: Option<DateTime<Utc>>,
    pub skipped_at: Option<DateTime<Utc>>,
    pub skip_reason: Option<String>,
    pub reassigned_from: Option<String>,
    pub reassigned_at: Option<DateTime<Utc>>,
    pub reassignment_reason: Option<String>,

    /// Workflow executions this task has been shown inside. Append-only set;
    /// insertion deduplicates.
    pub surfaced_in_workflows: Vec<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New Task for creation (without generated fields)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    pub account_id: Uuid,
    pub assignee: String,
    pub created_by: String,
    pub task_type: TaskType,
    pub category: TaskCategory,
    pub title: String,
    pub due_date: Option<DateTime<Utc>>,
}

impl Task {
    pub fn from_new(new_task: NewTask, now: DateTime<Utc>) -> Task {
        Task {
            id: Uuid::new_v4(),
            account_id: new_task.account_id,
            assignee: new_task.assignee,
            created_by: new_task.created_by,
            task_type: new_task.task_type,
            category: new_task.category,
            title: new_task.title,
            status: TaskStatus::Pending,
            due_date: new_task.due_date,
            first_snoozed_at: None,
            max_snooze_date: None,
            snoozed_until: None,
            snooze_count: 0,
            force_action: false,
            auto_skip_at: None,
            completed_at: None,
            skipped_at: None,
            skip_reason: None,
            reassigned_from: None,
            reassigned_at: None,
            reassignment_reason: None,
            surfaced_in_workflows: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Record that this task was surfaced inside a workflow execution.
    /// Returns false when the reference was already present.
    pub fn record_surfaced_in(&mut self, execution_id: Uuid) -> bool {
        if self.surfaced_in_workflows.contains(&execution_id) {
            return false;
        }
        self.surfaced_in_workflows.push(execution_id);
        true
    }

    /// True once the bounded-snooze window has been established.
    pub fn has_snoozed(&self) -> bool {
        self.first_snoozed_at.is_some()
    }
}
