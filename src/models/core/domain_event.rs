//! Polled business event records consumed by event triggers. Events are
//! written by the wider platform (product analytics, enrichment feeds, manual
//! entry) and read here in batch; this engine never subscribes to a push bus.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::core::trigger::EventType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainEvent {
    pub id: Uuid,
    pub event_type: EventType,
    pub account_id: Option<Uuid>,
    /// Type-specific payload matched against trigger parameters
    pub params: serde_json::Value,
    pub occurred_at: DateTime<Utc>,
}

impl DomainEvent {
    pub fn new(
        event_type: EventType,
        account_id: Option<Uuid>,
        params: serde_json::Value,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_type,
            account_id,
            params,
            occurred_at,
        }
    }
}
