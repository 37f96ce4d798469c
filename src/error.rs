//! Error types for the lifecycle engine.
//!
//! `PolicyViolation` and `InvalidTransition` represent caller mistakes and are
//! always surfaced with an explanatory message. `DependencyUnavailable` covers
//! failed store or notification round-trips: during batch processing it is
//! caught per candidate, during a manual operation it propagates so the caller
//! can retry.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("Invalid transition from {from} on {event}")]
    InvalidTransition { from: String, event: String },

    #[error("Snooze policy violation: {0}")]
    PolicyViolation(String),

    #[error("Dependency unavailable: {0}")]
    DependencyUnavailable(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl EngineError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    /// Whether the error should be retried against the dependency rather than
    /// reported back as a caller mistake.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::DependencyUnavailable(_))
    }
}

impl From<sqlx::Error> for EngineError {
    fn from(err: sqlx::Error) -> Self {
        EngineError::DependencyUnavailable(format!("store error: {err}"))
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Internal(format!("JSON serialization error: {err}"))
    }
}

pub type EngineResult<T> = anyhow::Result<T, EngineError>;
