//! # Structured Logging
//!
//! Subscriber setup and span macros for request dispatch.

use crate::config::ObservabilityConfig;
use crate::errors::{LogicalError, Result};
use tracing_subscriber::EnvFilter;

/// Create a tracing span for one dispatched request.
///
/// ```rust,ignore
/// let span = dispatch_span!(req.operation, req.path);
/// let span = dispatch_span!(req.operation, req.path, mount = "secret/");
/// ```
#[macro_export]
macro_rules! dispatch_span {
    ($operation:expr, $path:expr) => {
        tracing::info_span!(
            "dispatch",
            operation = %$operation,
            path = %$path,
            request_id = %uuid::Uuid::new_v4(),
            mount = tracing::field::Empty
        )
    };
    ($operation:expr, $path:expr, $($field:tt)*) => {
        tracing::info_span!(
            "dispatch",
            operation = %$operation,
            path = %$path,
            request_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level. Installing twice is not an
/// error; the first subscriber stays in place.
pub fn init_logging(config: &ObservabilityConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level).map_err(|e| {
            LogicalError::config(format!("Invalid log level '{}': {}", config.log_level, e))
        })?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    let installed = if config.json_logging {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if installed.is_err() {
        // Subscriber already set elsewhere (e.g. tests); ignore.
        return Ok(());
    }

    tracing::info!(
        service_name = %config.service_name,
        log_level = %config.log_level,
        json_logging = %config.json_logging,
        "Logging initialized"
    );
    Ok(())
}
