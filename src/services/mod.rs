// Operator-facing service layer
//
// Thin command surfaces over the state machine and the store gateway, plus
// the read-only attention listing. Dependency failures propagate here so the
// caller can retry; the batch passes in `orchestration` are the ones that
// swallow per-candidate errors.

pub mod attention;
pub mod task_commands;
pub mod workflow_commands;

pub use attention::{list_attention_tasks, AttentionItem, AttentionList, Urgency};
pub use task_commands::TaskCommands;
pub use workflow_commands::WorkflowCommands;
