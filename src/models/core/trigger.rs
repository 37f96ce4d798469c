//! # Wake Trigger Model
//!
//! A trigger is created once with a workflow execution's snooze request and
//! its configuration is immutable from then on — a new snooze creates a new
//! trigger set. The one mutable field is `first_fired_at`, evaluator-owned
//! lifecycle state that makes AND combination work across evaluation passes:
//! a trigger counts as fired once it has been true on any past pass.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// How a multi-trigger set combines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TriggerLogic {
    /// Wake as soon as any trigger fires (default)
    Or,
    /// Wake only once every trigger has fired
    And,
}

impl Default for TriggerLogic {
    fn default() -> Self {
        Self::Or
    }
}

impl fmt::Display for TriggerLogic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Or => write!(f, "OR"),
            Self::And => write!(f, "AND"),
        }
    }
}

impl std::str::FromStr for TriggerLogic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OR" => Ok(Self::Or),
            "AND" => Ok(Self::And),
            _ => Err(format!("Invalid trigger logic: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    Date,
    Event,
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date => write!(f, "date"),
            Self::Event => write!(f, "event"),
        }
    }
}

impl std::str::FromStr for TriggerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date" => Ok(Self::Date),
            "event" => Ok(Self::Event),
            _ => Err(format!("Invalid trigger kind: {s}")),
        }
    }
}

/// Closed enumeration of domain events a trigger can wait on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    WorkflowActionCompleted,
    CustomerLogin,
    UsageThresholdCrossed,
    ManualEvent,
    ContactJobChange,
    CompanyFunding,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WorkflowActionCompleted => write!(f, "workflow_action_completed"),
            Self::CustomerLogin => write!(f, "customer_login"),
            Self::UsageThresholdCrossed => write!(f, "usage_threshold_crossed"),
            Self::ManualEvent => write!(f, "manual_event"),
            Self::ContactJobChange => write!(f, "contact_job_change"),
            Self::CompanyFunding => write!(f, "company_funding"),
        }
    }
}

impl std::str::FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "workflow_action_completed" => Ok(Self::WorkflowActionCompleted),
            "customer_login" => Ok(Self::CustomerLogin),
            "usage_threshold_crossed" => Ok(Self::UsageThresholdCrossed),
            "manual_event" => Ok(Self::ManualEvent),
            "contact_job_change" => Ok(Self::ContactJobChange),
            "company_funding" => Ok(Self::CompanyFunding),
            _ => Err(format!("Invalid event type: {s}")),
        }
    }
}

/// Immutable trigger configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TriggerConfig {
    /// Fires once `now` reaches the target instant. The timezone only shaped
    /// how the instant was originally constructed; comparison is absolute.
    Date {
        target: DateTime<Utc>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timezone: Option<String>,
    },
    /// Fires once a matching event is observed after the snooze began.
    Event {
        event_type: EventType,
        #[serde(default)]
        params: serde_json::Value,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    pub id: Uuid,
    pub execution_id: Uuid,
    /// Position within the execution's ordered trigger list
    pub position: i32,
    pub config: TriggerConfig,
    /// Set the first time the trigger evaluates true; never cleared
    pub first_fired_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Trigger {
    pub fn new(
        execution_id: Uuid,
        position: i32,
        config: TriggerConfig,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            execution_id,
            position,
            config,
            first_fired_at: None,
            created_at: now,
        }
    }

    pub fn kind(&self) -> TriggerKind {
        match self.config {
            TriggerConfig::Date { .. } => TriggerKind::Date,
            TriggerConfig::Event { .. } => TriggerKind::Event,
        }
    }

    /// Whether the trigger has fired on this or any earlier pass.
    pub fn has_fired(&self) -> bool {
        self.first_fired_at.is_some()
    }
}
