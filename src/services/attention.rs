//! # Attention Listing
//!
//! Read-only session-start surface: live tasks bucketed by deadline
//! proximity so an operator sees what needs attention first. Snoozed tasks
//! are excluded — they are deferred on purpose and come back through the
//! daily batch instead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::EngineResult;
use crate::state_machine::DeferredUnit;
use crate::store::StoreGateway;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    /// Past due date
    Overdue,
    /// Due today
    Critical,
    /// Due in 1–2 days
    Urgent,
    /// Due in 3–7 days
    Upcoming,
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overdue => write!(f, "overdue"),
            Self::Critical => write!(f, "critical"),
            Self::Urgent => write!(f, "urgent"),
            Self::Upcoming => write!(f, "upcoming"),
        }
    }
}

/// Bucket a due date by whole-day distance from `now`. `None` when the task
/// is too far out to warrant attention.
fn classify(due: DateTime<Utc>, now: DateTime<Utc>) -> Option<Urgency> {
    let days = (due.date_naive() - now.date_naive()).num_days();
    match days {
        d if d < 0 => Some(Urgency::Overdue),
        0 => Some(Urgency::Critical),
        1..=2 => Some(Urgency::Urgent),
        3..=7 => Some(Urgency::Upcoming),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttentionItem {
    pub task_id: Uuid,
    pub title: String,
    pub assignee: String,
    pub due_date: DateTime<Utc>,
    pub days_until_due: i64,
    pub urgency: Urgency,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttentionList {
    pub overdue: Vec<AttentionItem>,
    pub critical: Vec<AttentionItem>,
    pub urgent: Vec<AttentionItem>,
    pub upcoming: Vec<AttentionItem>,
}

impl AttentionList {
    pub fn total(&self) -> usize {
        self.overdue.len() + self.critical.len() + self.urgent.len() + self.upcoming.len()
    }

    /// Overdue or due-today tasks warrant an immediate callout.
    pub fn needs_immediate_attention(&self) -> bool {
        !self.overdue.is_empty() || !self.critical.is_empty()
    }

    /// Short callout lines for session-start display.
    pub fn headlines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if !self.overdue.is_empty() {
            lines.push(format!("{} OVERDUE task(s)", self.overdue.len()));
        }
        if !self.critical.is_empty() {
            lines.push(format!("{} task(s) due TODAY", self.critical.len()));
        }
        if !self.urgent.is_empty() {
            lines.push(format!("{} urgent task(s) due soon", self.urgent.len()));
        }
        lines
    }
}

/// Bucket live, non-deferred tasks with a due date by urgency. Buckets are
/// ordered by due date ascending.
pub async fn list_attention_tasks(
    store: &dyn StoreGateway,
    now: DateTime<Utc>,
    include_upcoming: bool,
) -> EngineResult<AttentionList> {
    let mut list = AttentionList::default();

    for task in store.live_tasks().await? {
        if task.is_deferred() {
            continue;
        }
        let Some(due) = task.due_date else { continue };
        let Some(urgency) = classify(due, now) else {
            continue;
        };
        if urgency == Urgency::Upcoming && !include_upcoming {
            continue;
        }

        let item = AttentionItem {
            task_id: task.id,
            title: task.title,
            assignee: task.assignee,
            due_date: due,
            days_until_due: (due.date_naive() - now.date_naive()).num_days(),
            urgency,
        };
        match urgency {
            Urgency::Overdue => list.overdue.push(item),
            Urgency::Critical => list.critical.push(item),
            Urgency::Urgent => list.urgent.push(item),
            Urgency::Upcoming => list.upcoming.push(item),
        }
    }

    for bucket in [
        &mut list.overdue,
        &mut list.critical,
        &mut list.urgent,
        &mut list.upcoming,
    ] {
        bucket.sort_by_key(|item| item.due_date);
    }
    Ok(list)
}
