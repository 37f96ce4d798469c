//! Aggregated results for the batch passes.
//!
//! Both passes collect per-candidate errors instead of failing fast; the
//! result types carry the counts plus the full error list, and render a
//! human-readable summary for operational logging.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Aggregate outcome of one `run_daily_evaluation` pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Tasks returned from `snoozed` to `pending`
    pub resurfaced: usize,
    /// Tasks newly marked `force_action`
    pub force_flagged: usize,
    /// Tasks skipped after their grace period expired
    pub auto_skipped: usize,
    /// Notifications successfully delivered across all steps
    pub notifications_sent: usize,
    /// Notification rows removed by the retention cleanup
    pub notifications_deleted: u64,
    /// One entry per failed candidate, naming the candidate's id
    pub errors: Vec<String>,
}

impl EvaluationResult {
    pub fn record_error(&mut self, stage: &str, id: uuid::Uuid, error: impl std::fmt::Display) {
        self.errors.push(format!("{stage} {id}: {error}"));
    }

    pub fn record_sent(&mut self, sent: bool) {
        if sent {
            self.notifications_sent += 1;
        }
    }

    /// Human-readable summary: counts plus a numbered error list.
    pub fn summary(&self) -> String {
        let mut out = format!(
            "Daily evaluation complete: {} resurfaced, {} force-flagged, {} auto-skipped, \
             {} notification(s) sent, {} notification(s) deleted, {} error(s)",
            self.resurfaced,
            self.force_flagged,
            self.auto_skipped,
            self.notifications_sent,
            self.notifications_deleted,
            self.errors.len()
        );
        for (index, error) in self.errors.iter().enumerate() {
            let _ = write!(out, "\n  {}. {error}", index + 1);
        }
        out
    }
}

/// Aggregate outcome of one `run_wake_evaluation` pass over snoozed workflow
/// executions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WakeEvaluationResult {
    /// Executions whose trigger set was evaluated this pass
    pub evaluated: usize,
    /// Executions that woke
    pub woken: usize,
    /// Executions that remain snoozed after evaluation
    pub still_snoozed: usize,
    pub notifications_sent: usize,
    pub errors: Vec<String>,
}

impl WakeEvaluationResult {
    pub fn record_error(&mut self, id: uuid::Uuid, error: impl std::fmt::Display) {
        self.errors.push(format!("evaluate {id}: {error}"));
    }

    pub fn summary(&self) -> String {
        let mut out = format!(
            "Wake evaluation complete: {} evaluated, {} woken, {} still snoozed, \
             {} notification(s) sent, {} error(s)",
            self.evaluated,
            self.woken,
            self.still_snoozed,
            self.notifications_sent,
            self.errors.len()
        );
        for (index, error) in self.errors.iter().enumerate() {
            let _ = write!(out, "\n  {}. {error}", index + 1);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_renders_numbered_errors() {
        let mut result = EvaluationResult {
            resurfaced: 3,
            force_flagged: 1,
            ..EvaluationResult::default()
        };
        result.record_error("resurface", uuid::Uuid::nil(), "store error: timeout");

        let summary = result.summary();
        assert!(summary.contains("3 resurfaced"));
        assert!(summary.contains("1 error(s)"));
        assert!(summary.contains("1. resurface 00000000-0000-0000-0000-000000000000"));
    }

    #[test]
    fn test_clean_summary_has_no_error_lines() {
        let result = WakeEvaluationResult {
            evaluated: 2,
            woken: 1,
            still_snoozed: 1,
            ..WakeEvaluationResult::default()
        };
        assert!(!result.summary().contains('\n'));
    }
}
