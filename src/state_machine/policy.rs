//! # Snooze Policy Guard
//!
//! Enforces the bounded-deferral rule: the deferral window is anchored to the
//! *first* snooze, not to each renewal, so repeated short snoozes cannot defer
//! a task indefinitely. Once `max_snooze_date` passes, the task must be
//! completed or skipped.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::constants;
use crate::models::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnoozePolicy {
    pub window: Duration,
}

impl Default for SnoozePolicy {
    fn default() -> Self {
        Self {
            window: Duration::days(constants::SNOOZE_WINDOW_DAYS),
        }
    }
}

/// Outcome of validating a snooze request against the bounded-deferral rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SnoozeValidation {
    Accepted {
        /// Whole days until the window closes. For a first snooze this is the
        /// full window being established.
        days_remaining: i64,
        /// True when this request will establish the window
        establishes_window: bool,
    },
    Rejected {
        reason: String,
        days_remaining: i64,
        /// Reported so the caller can offer a valid alternative wake date
        max_snooze_date: DateTime<Utc>,
    },
}

impl SnoozeValidation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    pub fn rejection_reason(&self) -> Option<&str> {
        match self {
            Self::Rejected { reason, .. } => Some(reason),
            Self::Accepted { .. } => None,
        }
    }
}

impl SnoozePolicy {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    /// Validate a snooze request. Never mutates the task.
    pub fn validate(
        &self,
        task: &Task,
        requested_wake: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> SnoozeValidation {
        let Some(max_snooze_date) = task.max_snooze_date else {
            // No prior snooze: the request establishes the window starting now.
            return SnoozeValidation::Accepted {
                days_remaining: self.window.num_days(),
                establishes_window: true,
            };
        };

        if now >= max_snooze_date {
            return SnoozeValidation::Rejected {
                reason: "Snooze deadline has passed; the task must be completed or skipped"
                    .to_string(),
                days_remaining: 0,
                max_snooze_date,
            };
        }

        let days_remaining = (max_snooze_date - now).num_days();

        if requested_wake > max_snooze_date {
            return SnoozeValidation::Rejected {
                reason: format!(
                    "Requested wake date exceeds the snooze window; {days_remaining} day(s) remain until {max_snooze_date}"
                ),
                days_remaining,
                max_snooze_date,
            };
        }

        SnoozeValidation::Accepted {
            days_remaining,
            establishes_window: false,
        }
    }
}
