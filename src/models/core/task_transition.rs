//! Append-only status-transition audit rows, written alongside every applied
//! task transition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state_machine::TaskStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskTransition {
    pub id: Uuid,
    pub task_id: Uuid,
    pub from_status: TaskStatus,
    pub to_status: TaskStatus,
    /// Lifecycle event name, see [`crate::constants::events`]
    pub event: String,
    pub detail: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl TaskTransition {
    pub fn new(
        task_id: Uuid,
        from_status: TaskStatus,
        to_status: TaskStatus,
        event: &str,
        detail: Option<String>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            task_id,
            from_status,
            to_status,
            event: event.to_string(),
            detail,
            occurred_at,
        }
    }
}
