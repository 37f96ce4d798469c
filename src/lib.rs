#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Beacon Core
//!
//! The deferred-work lifecycle engine of the Beacon customer-success
//! platform: the component that lets a unit of work — a task assigned to one
//! operator, or an entire workflow execution — be temporarily deferred
//! ("snoozed"), bounded by policy so it cannot be deferred forever, and
//! automatically resurfaced when a wall-clock deadline or a domain event
//! occurs.
//!
//! ## Overview
//!
//! Deferral is bounded: the first snooze anchors a 7-day window, and once it
//! closes the task is force-flagged, granted a grace period, and finally
//! auto-skipped if its type's policy allows. Workflow executions defer behind
//! a set of date/event wake triggers combined with OR or AND logic. Both
//! lifecycles are driven by scheduler-invoked batch passes that are
//! idempotent for a fixed `now` and tolerate per-candidate failures.
//!
//! ## Module Organization
//!
//! - [`models`] - Record types: tasks, policies, executions, triggers, audit rows
//! - [`state_machine`] - Legal transitions, the bounded-snooze policy guard
//! - [`evaluator`] - Wake trigger evaluation with OR/AND combination
//! - [`orchestration`] - The daily task pass and the wake-trigger pass
//! - [`scoring`] - Pure priority scorer with an explainable breakdown
//! - [`services`] - Operator-facing commands and the attention listing
//! - [`store`] - Store gateway trait, Postgres and in-memory implementations
//! - [`notifications`] - Fire-and-forget notification sink
//! - [`clock`] - Injected time source; all evaluation takes `now` explicitly
//! - [`config`] - Deployable knobs loaded from defaults, TOML, and environment
//! - [`error`] - Structured error taxonomy
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use beacon_core::clock::{Clock, SystemClock};
//! use beacon_core::notifications::StoreNotificationSink;
//! use beacon_core::orchestration::EvaluationOrchestrator;
//! use beacon_core::store::MemoryStore;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let store = Arc::new(MemoryStore::new());
//! let sink = Arc::new(StoreNotificationSink::new(store.clone()));
//! let orchestrator = EvaluationOrchestrator::new(store, sink);
//!
//! // One `now` per pass; the scheduler invokes this daily.
//! let now = SystemClock.now();
//! let result = orchestrator.run_daily_evaluation(now).await;
//! println!("{}", result.summary());
//!
//! let wake_result = orchestrator.run_wake_evaluation(now).await;
//! println!("{}", wake_result.summary());
//! # }
//! ```
//!
//! ## Testing
//!
//! The suite runs entirely against the in-memory gateway:
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # All tests
//! ```

pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod evaluator;
pub mod logging;
pub mod models;
pub mod notifications;
pub mod orchestration;
pub mod scoring;
pub mod services;
pub mod state_machine;
pub mod store;
pub mod test_helpers;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{load_config, EngineConfig};
pub use error::{EngineError, EngineResult};
pub use evaluator::{EvaluationOutcome, EventSource, TriggerEvaluator};
pub use models::{
    NewTask, Notification, NotificationKind, Task, TaskCategory, TaskType, TaskTypePolicy,
    Trigger, TriggerConfig, TriggerKind, TriggerLogic, WorkflowExecution,
};
pub use notifications::{NotificationSink, StoreNotificationSink};
pub use orchestration::{EvaluationOrchestrator, EvaluationResult, WakeEvaluationResult};
pub use scoring::{score, OperatorContext, ScoreBreakdown, ScoreContext, UnitType};
pub use services::{list_attention_tasks, TaskCommands, WorkflowCommands};
pub use state_machine::{
    DeferredUnit, SnoozePolicy, SnoozeValidation, TaskStatus, WorkflowStatus,
};
pub use store::{MemoryStore, PgStore, StoreGateway};
