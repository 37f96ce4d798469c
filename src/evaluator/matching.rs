//! Event-to-trigger matching semantics.
//!
//! Matching is type-specific but always reduces to a boolean. Usage-threshold
//! triggers compare a metric value against a configured threshold with a
//! comparison operator; job-change and funding triggers match on
//! company/contact identity; everything else is a parameter-subset match. A
//! trigger with empty parameters matches any event of its type.

use serde_json::Value;

use crate::models::{DomainEvent, EventType};

/// Does this observed event satisfy the trigger's parameters?
pub fn event_matches(event_type: EventType, params: &Value, event: &DomainEvent) -> bool {
    if event.event_type != event_type {
        return false;
    }

    match event_type {
        EventType::UsageThresholdCrossed => usage_threshold_matches(params, &event.params),
        EventType::ContactJobChange => {
            identity_matches(params, &event.params, &["contact_id", "company_id"])
        }
        EventType::CompanyFunding => identity_matches(params, &event.params, &["company_id"]),
        EventType::WorkflowActionCompleted
        | EventType::CustomerLogin
        | EventType::ManualEvent => subset_matches(params, &event.params),
    }
}

/// Every identity key present in the trigger params must equal the event's.
fn identity_matches(params: &Value, event_params: &Value, keys: &[&str]) -> bool {
    keys.iter().all(|key| match params.get(key) {
        Some(expected) => event_params.get(key) == Some(expected),
        None => true,
    })
}

/// Every key in the trigger params must appear in the event with an equal
/// value.
fn subset_matches(params: &Value, event_params: &Value) -> bool {
    match params.as_object() {
        Some(map) => map
            .iter()
            .all(|(key, expected)| event_params.get(key) == Some(expected)),
        None => true,
    }
}

fn usage_threshold_matches(params: &Value, event_params: &Value) -> bool {
    let Some(metric) = params.get("metric").and_then(Value::as_str) else {
        return false;
    };
    if event_params.get("metric").and_then(Value::as_str) != Some(metric) {
        return false;
    }

    let Some(threshold) = params.get("threshold").and_then(Value::as_f64) else {
        return false;
    };
    let Some(value) = event_params.get("value").and_then(Value::as_f64) else {
        return false;
    };

    match params.get("operator").and_then(Value::as_str).unwrap_or("gte") {
        "gt" => value > threshold,
        "gte" => value >= threshold,
        "lt" => value < threshold,
        "lte" => value <= threshold,
        "eq" => (value - threshold).abs() < f64::EPSILON,
        _ => false,
    }
}
