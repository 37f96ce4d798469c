// Batch orchestration for the deferred-work lifecycle
//
// Two scheduler-driven passes share one orchestrator: the daily task pass
// (resurface, force-flag, auto-skip, retention cleanup) and the wake-trigger
// pass over snoozed workflow executions. Both collect per-candidate errors
// instead of failing fast, and both are idempotent for a fixed `now`.

pub mod daily_evaluation;
pub mod types;
pub mod wake_evaluation;

pub use daily_evaluation::EvaluationOrchestrator;
pub use types::{EvaluationResult, WakeEvaluationResult};
