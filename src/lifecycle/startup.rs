//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Initialize logging and metrics in dependency order
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Without a config file the defaults plus environment overrides apply

use std::path::Path;

use crate::config::loader::{apply_env_overrides, finalize};
use crate::config::{load_config, ConfigError, EdgeConfig};
use crate::error::EdgeError;
use crate::observability::{logging, metrics};

/// Resolve the configuration the service starts with.
pub fn load_startup_config(path: Option<&Path>) -> Result<EdgeConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => {
            let mut config = EdgeConfig::default();
            apply_env_overrides(&mut config);
            finalize(config)
        }
    }
}

/// Install logging, then the metrics endpoint if enabled.
pub fn init_observability(config: &EdgeConfig) -> Result<(), EdgeError> {
    logging::init_logging(&config.observability)?;

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }
    Ok(())
}
