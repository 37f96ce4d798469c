//! # Notification Sink
//!
//! One-way delivery seam. The contract callers rely on: a notification
//! failure is logged and swallowed, never re-thrown — losing a notification
//! must never block a state transition that has already been persisted.
//! Callers therefore always write state first and notify second.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::warn;

use crate::error::EngineResult;
use crate::models::{Notification, NotificationKind};
use crate::store::StoreGateway;

#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver a notification. Implementations may fail; callers go through
    /// [`notify_best_effort`] which swallows the failure.
    async fn notify(
        &self,
        user_id: &str,
        kind: NotificationKind,
        payload: serde_json::Value,
        now: DateTime<Utc>,
    ) -> EngineResult<()>;
}

/// Fire a notification, logging and swallowing any failure. Returns whether
/// the delivery succeeded so batch results can count sends.
pub async fn notify_best_effort(
    sink: &dyn NotificationSink,
    user_id: &str,
    kind: NotificationKind,
    payload: serde_json::Value,
    now: DateTime<Utc>,
) -> bool {
    match sink.notify(user_id, kind, payload, now).await {
        Ok(()) => true,
        Err(err) => {
            warn!(user_id = %user_id, kind = %kind, error = %err, "notification delivery failed");
            false
        }
    }
}

/// Production sink: persists notification rows through the store gateway for
/// the platform's delivery workers to pick up.
pub struct StoreNotificationSink {
    store: Arc<dyn StoreGateway>,
}

impl StoreNotificationSink {
    pub fn new(store: Arc<dyn StoreGateway>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl NotificationSink for StoreNotificationSink {
    async fn notify(
        &self,
        user_id: &str,
        kind: NotificationKind,
        payload: serde_json::Value,
        now: DateTime<Utc>,
    ) -> EngineResult<()> {
        let notification = Notification::new(user_id, kind, payload, now);
        self.store.insert_notification(&notification).await
    }
}
