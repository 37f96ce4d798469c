//! Per-task-type deferral policy. Absence of a stored row means the defaults
//! apply, so lookups return a synthesized default rather than an error.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::constants;
use crate::models::core::task::TaskType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskTypePolicy {
    pub task_type: TaskType,
    pub auto_skip_enabled: bool,
    pub auto_skip_grace_hours: i64,
    pub requires_manual_escalation: bool,
}

impl TaskTypePolicy {
    /// The policy applied when no row exists for a task type.
    pub fn default_for(task_type: TaskType) -> Self {
        Self {
            task_type,
            auto_skip_enabled: true,
            auto_skip_grace_hours: constants::DEFAULT_AUTO_SKIP_GRACE_HOURS,
            requires_manual_escalation: false,
        }
    }

    pub fn grace_period(&self) -> Duration {
        Duration::hours(self.auto_skip_grace_hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = TaskTypePolicy::default_for(TaskType::FollowUp);
        assert!(policy.auto_skip_enabled);
        assert_eq!(policy.auto_skip_grace_hours, 24);
        assert!(!policy.requires_manual_escalation);
        assert_eq!(policy.grace_period(), Duration::hours(24));
    }
}
