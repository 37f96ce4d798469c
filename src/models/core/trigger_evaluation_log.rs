//! Append-only audit records for wake trigger evaluation. One row per trigger
//! per evaluation pass. Exists purely for observability and debugging; the
//! evaluator never reads these back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerEvaluationLog {
    pub id: Uuid,
    pub trigger_id: Uuid,
    pub execution_id: Uuid,
    pub fired: bool,
    /// How many times this trigger has been evaluated, this pass included
    pub evaluation_count: i32,
    pub fired_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub evaluated_at: DateTime<Utc>,
}

/// Log entry before the store assigns id and cumulative evaluation count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTriggerEvaluation {
    pub trigger_id: Uuid,
    pub execution_id: Uuid,
    pub fired: bool,
    pub fired_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub evaluated_at: DateTime<Utc>,
}
