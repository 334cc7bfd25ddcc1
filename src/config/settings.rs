//! # Configuration Settings
//!
//! Defines the configuration structure for request routing and logging.

use crate::errors::{LogicalError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct AppConfig {
    /// Router and rollback sweep configuration
    #[validate(nested)]
    pub router: RouterConfig,

    /// Logging configuration
    #[validate(nested)]
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(LogicalError::from)?;
        self.validate_custom()?;
        Ok(())
    }

    fn validate_custom(&self) -> Result<()> {
        let level = self.observability.log_level.to_lowercase();
        if !VALID_LOG_LEVELS.contains(&level.as_str()) {
            return Err(LogicalError::validation_field(
                format!("Unknown log level '{}'", self.observability.log_level),
                "log_level",
            ));
        }
        Ok(())
    }

    /// Create configuration from `LOGICAL_*` environment variables and validate it
    pub fn from_env() -> Result<Self> {
        let config = Self {
            router: RouterConfig::from_env(),
            observability: ObservabilityConfig::from_env(),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Router configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RouterConfig {
    /// Run the periodic rollback sweep
    pub rollback_enabled: bool,

    /// Seconds between rollback sweeps
    #[validate(range(
        min = 1,
        max = 3600,
        message = "Rollback interval must be between 1 and 3600 seconds"
    ))]
    pub rollback_interval_seconds: u64,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            rollback_enabled: true,
            rollback_interval_seconds: 60,
        }
    }
}

impl RouterConfig {
    /// Get rollback interval as Duration
    pub fn rollback_interval(&self) -> Duration {
        Duration::from_secs(self.rollback_interval_seconds)
    }

    pub fn from_env() -> Self {
        let rollback_enabled = std::env::var("LOGICAL_ROLLBACK_ENABLED")
            .map(|s| s.to_lowercase() == "true" || s == "1")
            .unwrap_or(true);

        let rollback_interval_seconds = std::env::var("LOGICAL_ROLLBACK_INTERVAL_SECONDS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(60);

        Self {
            rollback_enabled,
            rollback_interval_seconds,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ObservabilityConfig {
    /// Service name attached to log output
    #[validate(length(min = 1, message = "Service name cannot be empty"))]
    pub service_name: String,

    /// Log level (trace, debug, info, warn, error); `RUST_LOG` takes precedence
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Enable JSON structured logging
    pub json_logging: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "logical-backend".to_string(),
            log_level: "info".to_string(),
            json_logging: false,
        }
    }
}

impl ObservabilityConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            service_name: std::env::var("LOGICAL_SERVICE_NAME")
                .unwrap_or(defaults.service_name),
            log_level: std::env::var("LOGICAL_LOG_LEVEL").unwrap_or(defaults.log_level),
            json_logging: std::env::var("LOGICAL_JSON_LOGGING")
                .map(|s| s.to_lowercase() == "true" || s == "1")
                .unwrap_or(defaults.json_logging),
        }
    }
}
