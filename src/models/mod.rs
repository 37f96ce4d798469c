//! Data layer for the lifecycle engine.

pub mod core;

pub use core::domain_event::DomainEvent;
pub use core::notification::{Notification, NotificationKind};
pub use core::task::{NewTask, Task, TaskCategory, TaskType};
pub use core::task_transition::TaskTransition;
pub use core::task_type_policy::TaskTypePolicy;
pub use core::trigger::{EventType, Trigger, TriggerConfig, TriggerKind, TriggerLogic};
pub use core::trigger_evaluation_log::{NewTriggerEvaluation, TriggerEvaluationLog};
pub use core::workflow_execution::WorkflowExecution;
