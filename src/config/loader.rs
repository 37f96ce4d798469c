//! Configuration loader.
//!
//! Layering, lowest precedence first: compiled defaults, the TOML file named
//! by `BEACON_CONFIG` (optional), then `BEACON_`-prefixed environment
//! variables (`BEACON_SNOOZE_WINDOW_DAYS=10`).

use config::{Config, Environment, File, FileFormat};
use tracing::debug;

use super::EngineConfig;
use crate::error::{EngineError, EngineResult};

/// Load and validate the engine configuration.
pub fn load_config() -> EngineResult<EngineConfig> {
    let mut builder = Config::builder()
        .set_default("snooze_window_days", crate::constants::SNOOZE_WINDOW_DAYS)
        .map_err(config_error)?
        .set_default(
            "default_auto_skip_grace_hours",
            crate::constants::DEFAULT_AUTO_SKIP_GRACE_HOURS,
        )
        .map_err(config_error)?
        .set_default(
            "notification_retention_days",
            crate::constants::NOTIFICATION_RETENTION_DAYS,
        )
        .map_err(config_error)?;

    if let Ok(path) = std::env::var("BEACON_CONFIG") {
        debug!(path = %path, "loading configuration file");
        builder = builder.add_source(File::new(&path, FileFormat::Toml).required(false));
    }

    let settings = builder
        .add_source(Environment::with_prefix("BEACON"))
        .build()
        .map_err(config_error)?;

    let config: EngineConfig = settings.try_deserialize().map_err(config_error)?;
    config.validate()?;

    debug!(
        snooze_window_days = config.snooze_window_days,
        default_auto_skip_grace_hours = config.default_auto_skip_grace_hours,
        notification_retention_days = config.notification_retention_days,
        "engine configuration loaded"
    );

    Ok(config)
}

fn config_error(err: config::ConfigError) -> EngineError {
    EngineError::Configuration(err.to_string())
}
