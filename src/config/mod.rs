//! # Engine Configuration
//!
//! Deployable knobs for the lifecycle engine, loaded from defaults, an
//! optional TOML file, and `BEACON_`-prefixed environment overrides. All
//! values default to the compiled-in constants so the engine runs with no
//! configuration present.

pub mod loader;

pub use loader::load_config;

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Days a task may remain deferred, anchored to its first snooze.
    pub snooze_window_days: i64,

    /// Grace hours applied when a task type has no policy row.
    pub default_auto_skip_grace_hours: i64,

    /// Notifications older than this many days are deleted by the daily
    /// retention cleanup.
    pub notification_retention_days: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            snooze_window_days: constants::SNOOZE_WINDOW_DAYS,
            default_auto_skip_grace_hours: constants::DEFAULT_AUTO_SKIP_GRACE_HOURS,
            notification_retention_days: constants::NOTIFICATION_RETENTION_DAYS,
        }
    }
}

impl EngineConfig {
    /// Reject configurations the engine cannot honor.
    pub fn validate(&self) -> EngineResult<()> {
        if self.snooze_window_days < 1 {
            return Err(EngineError::Configuration(format!(
                "snooze_window_days must be at least 1, got {}",
                self.snooze_window_days
            )));
        }
        if self.default_auto_skip_grace_hours < constants::DEFAULT_AUTO_SKIP_GRACE_HOURS
            || self.default_auto_skip_grace_hours > constants::MAX_AUTO_SKIP_GRACE_HOURS
        {
            return Err(EngineError::Configuration(format!(
                "default_auto_skip_grace_hours must be within {}..={}, got {}",
                constants::DEFAULT_AUTO_SKIP_GRACE_HOURS,
                constants::MAX_AUTO_SKIP_GRACE_HOURS,
                self.default_auto_skip_grace_hours
            )));
        }
        if self.notification_retention_days < 1 {
            return Err(EngineError::Configuration(format!(
                "notification_retention_days must be at least 1, got {}",
                self.notification_retention_days
            )));
        }
        Ok(())
    }

    pub fn snooze_window(&self) -> chrono::Duration {
        chrono::Duration::days(self.snooze_window_days)
    }

    pub fn notification_retention(&self) -> chrono::Duration {
        chrono::Duration::days(self.notification_retention_days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.snooze_window_days, 7);
        assert_eq!(config.default_auto_skip_grace_hours, 24);
        assert_eq!(config.notification_retention_days, 90);
    }

    #[test]
    fn test_out_of_range_grace_rejected() {
        let config = EngineConfig {
            default_auto_skip_grace_hours: 72,
            ..EngineConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));
    }

    #[test]
    fn test_zero_window_rejected() {
        let config = EngineConfig {
            snooze_window_days: 0,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
