//! Source of polled domain events for event-trigger evaluation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::error::EngineResult;
use crate::models::{DomainEvent, EventType};
use crate::store::StoreGateway;

#[async_trait]
pub trait EventSource: Send + Sync {
    /// Events of the given type observed at or after `since`.
    async fn events_since(
        &self,
        event_type: EventType,
        since: DateTime<Utc>,
    ) -> EngineResult<Vec<DomainEvent>>;
}

/// Reads events through the store gateway, the production wiring.
pub struct StoreEventSource {
    store: Arc<dyn StoreGateway>,
}

impl StoreEventSource {
    pub fn new(store: Arc<dyn StoreGateway>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl EventSource for StoreEventSource {
    async fn events_since(
        &self,
        event_type: EventType,
        since: DateTime<Utc>,
    ) -> EngineResult<Vec<DomainEvent>> {
        self.store.events_since(event_type, since).await
    }
}
