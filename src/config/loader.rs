//! Configuration loading from disk and the environment.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::EdgeConfig;
use crate::config::validation::{normalize_origin, validate_config, ValidationError};

/// Deployment mode override (`production` enables production rules).
pub const ENV_MODE: &str = "EDGE_ENV";
/// Public origin override.
pub const ENV_ORIGIN: &str = "EDGE_ORIGIN";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<EdgeConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut config = parse_config(&content)?;
    apply_env_overrides(&mut config);
    finalize(config)
}

/// Parse without validating or applying overrides.
pub fn parse_config(content: &str) -> Result<EdgeConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Validate and normalize a config assembled in memory.
pub fn finalize(mut config: EdgeConfig) -> Result<EdgeConfig, ConfigError> {
    validate_config(&config).map_err(ConfigError::Validation)?;
    config.site.origin = config.site.origin.as_deref().and_then(normalize_origin);
    Ok(config)
}

/// Apply `EDGE_ENV` / `EDGE_ORIGIN` from the process environment.
pub fn apply_env_overrides(config: &mut EdgeConfig) {
    apply_overrides_from(config, |key| std::env::var(key).ok());
}

/// Apply overrides from an arbitrary lookup.
pub fn apply_overrides_from<F>(config: &mut EdgeConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(mode) = lookup(ENV_MODE) {
        config.site.production = mode.trim().eq_ignore_ascii_case("production");
    }
    if let Some(origin) = lookup(ENV_ORIGIN) {
        let origin = origin.trim();
        config.site.origin = (!origin.is_empty()).then(|| origin.to_string());
    }
}
