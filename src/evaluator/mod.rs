// Wake trigger evaluation for snoozed workflow executions
//
// Date triggers compare against the injected `now`; event triggers poll the
// event source for matching records observed since the snooze began. OR
// combination wakes on the first firing trigger, AND only once the full set
// has fired cumulatively across passes.

pub mod event_source;
pub mod matching;
pub mod trigger_evaluator;

pub use event_source::{EventSource, StoreEventSource};
pub use matching::event_matches;
pub use trigger_evaluator::{EvaluationOutcome, TriggerEvaluator};
