//! # Structured Logging Module
//!
//! Environment-aware console logging using the tracing ecosystem. Designed
//! for containerized deployment where logs go to stdout and are collected
//! externally.

use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize the global tracing subscriber once. Safe to call from multiple
/// entry points; later calls are no-ops, as is running under a host process
/// that already installed a subscriber.
pub fn init_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let log_level = get_log_level(&environment);

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(log_level.clone()));
        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_filter(filter),
        );

        if subscriber.try_init().is_err() {
            tracing::debug!("global tracing subscriber already initialized");
        }

        tracing::info!(environment = %environment, level = %log_level, "logging initialized");
    });
}

/// Current environment, `development` when unset.
fn get_environment() -> String {
    std::env::var("BEACON_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// Default log level per environment, overridable via `RUST_LOG`.
fn get_log_level(environment: &str) -> String {
    match environment {
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

/// Structured log for a single task lifecycle operation.
pub fn log_task_operation(
    operation: &str,
    task_id: uuid::Uuid,
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        task_id = %task_id,
        status = %status,
        details = details,
        "task operation"
    );
}

/// Structured log for a completed batch step.
pub fn log_batch_step(step: &str, processed: usize, failed: usize) {
    tracing::info!(
        step = %step,
        processed = processed,
        failed = failed,
        "batch step complete"
    );
}
