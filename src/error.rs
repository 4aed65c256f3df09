//! Top-level error type.
//!
//! Routing itself never fails. These are the infrastructure failures that
//! stop the service from starting or running.

use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum EdgeError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("logging setup failed: {0}")]
    Logging(String),

    #[error("config watcher failed: {0}")]
    Watch(#[from] notify::Error),
}
